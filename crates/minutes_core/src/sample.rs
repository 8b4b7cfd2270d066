//! Sample meetings used to seed a fresh store.

use crate::model::meeting::{ActionItem, AgendaItem, Meeting, MeetingDraft, MeetingStatus};

fn agenda(id: &str, title: &str, duration: &str) -> AgendaItem {
    AgendaItem {
        id: id.to_string(),
        title: title.to_string(),
        duration: duration.to_string(),
    }
}

fn action(id: &str, task: &str, owner: &str, due_date: &str, completed: bool) -> ActionItem {
    ActionItem {
        id: id.to_string(),
        task: task.to_string(),
        owner: owner.to_string(),
        due_date: due_date.to_string(),
        completed,
    }
}

/// Two example meetings, most recent last.
pub fn sample_meetings() -> Vec<Meeting> {
    vec![
        Meeting::new(
            "1",
            MeetingDraft {
                title: "Q4 Product Strategy Review".to_string(),
                date: "2025-10-15T10:00".to_string(),
                attendees_text: "Alice Chen, Bob Smith, Charlie Davis".to_string(),
                agenda_items: vec![
                    agenda("a1", "Review Q3 Metrics", "15m"),
                    agenda("a2", "Q4 Roadmap Brainstorm", "30m"),
                    agenda("a3", "Resource Allocation", "15m"),
                ],
                discussion_notes: "Alice presented the Q3 metrics. Growth is steady at 15% MoM. \
                    Churn has decreased slightly.\n\nBob raised concerns about the engineering \
                    bandwidth for the new AI features. We agreed to prioritize the core \
                    infrastructure first."
                    .to_string(),
                action_items: vec![
                    action("ac1", "Finalize Q4 roadmap document", "Alice Chen", "2025-10-20", false),
                    action("ac2", "Hire 2 senior backend engineers", "Charlie Davis", "2025-11-01", false),
                ],
                decisions: "1. Prioritize \"Project Falcon\" over \"Project Eagle\".\n\
                    2. Approve budget for 2 new hires."
                    .to_string(),
                status: MeetingStatus::Finalized,
            },
        ),
        Meeting::new(
            "2",
            MeetingDraft {
                title: "Weekly Design Sync".to_string(),
                date: "2025-12-03T14:00".to_string(),
                attendees_text: "Sarah Lee, Mike Brown".to_string(),
                agenda_items: vec![
                    agenda("a1", "Critique: New Dashboard", "20m"),
                    agenda("a2", "Design System Updates", "10m"),
                ],
                discussion_notes:
                    "Reviewed the new dashboard layouts. The \"Dark Mode\" contrast needs adjustment."
                        .to_string(),
                action_items: vec![action(
                    "ac1",
                    "Update color tokens in Figma",
                    "Sarah Lee",
                    "2025-12-05",
                    true,
                )],
                decisions: "Adopt the new \"Inter\" font pairing for all headers.".to_string(),
                status: MeetingStatus::Draft,
            },
        ),
    ]
}
