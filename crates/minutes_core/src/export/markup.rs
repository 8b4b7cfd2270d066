//! Static document fragment for export.
//!
//! The fragment is rebuilt from the draft on every export and is
//! independent of any interactive styling.
//!
//! # Invariants
//! - Agenda and action sections are omitted when their list is empty.
//! - The decisions block is omitted when decisions are blank.
//! - Discussion notes keep their line breaks.

use crate::model::dates::format_long;
use crate::model::meeting::MeetingDraft;

/// One block of the export fragment, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    /// `label: value` metadata line.
    Meta {
        label: &'static str,
        value: String,
    },
    SectionHeading(&'static str),
    AgendaRow {
        /// One-based position.
        number: usize,
        title: String,
        duration: String,
    },
    /// Whitespace-preserving paragraph.
    Notes(String),
    /// Visually distinct decisions box.
    Decisions(String),
    ActionRow {
        completed: bool,
        task: String,
        owner: Option<String>,
        due_date: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportDocument {
    pub blocks: Vec<Block>,
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Composes the export fragment for a draft.
pub fn compose(draft: &MeetingDraft) -> ExportDocument {
    let mut blocks = vec![
        Block::Title(or_default(&draft.title, "Untitled Meeting")),
        Block::Meta {
            label: "Date",
            value: format_long(&draft.date).unwrap_or_else(|| "N/A".to_string()),
        },
        Block::Meta {
            label: "Attendees",
            value: or_default(&draft.attendees_text, "None"),
        },
    ];

    if !draft.agenda_items.is_empty() {
        blocks.push(Block::SectionHeading("Agenda"));
        blocks.extend(
            draft
                .agenda_items
                .iter()
                .enumerate()
                .map(|(index, item)| Block::AgendaRow {
                    number: index + 1,
                    title: or_default(&item.title, "Untitled"),
                    duration: item.duration.trim().to_string(),
                }),
        );
    }

    blocks.push(Block::SectionHeading("Discussion Notes"));
    blocks.push(Block::Notes(or_default(
        &draft.discussion_notes,
        "No notes recorded.",
    )));

    if !draft.decisions.trim().is_empty() {
        blocks.push(Block::Decisions(draft.decisions.clone()));
    }

    if !draft.action_items.is_empty() {
        blocks.push(Block::SectionHeading("Action Items"));
        blocks.extend(draft.action_items.iter().map(|item| Block::ActionRow {
            completed: item.completed,
            task: or_default(&item.task, "Untitled Task"),
            owner: non_blank(&item.owner),
            due_date: non_blank(&item.due_date),
        }));
    }

    ExportDocument { blocks }
}

impl ExportDocument {
    /// Plain-text rendering, one block per paragraph.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Title(title) => {
                    out.push_str(title);
                    out.push('\n');
                }
                Block::Meta { label, value } => {
                    out.push_str(&format!("{label}: {value}\n"));
                }
                Block::SectionHeading(heading) => {
                    out.push_str(&format!("\n{heading}\n"));
                }
                Block::AgendaRow {
                    number,
                    title,
                    duration,
                } => {
                    if duration.is_empty() {
                        out.push_str(&format!("  {number}. {title}\n"));
                    } else {
                        out.push_str(&format!("  {number}. {title} ({duration})\n"));
                    }
                }
                Block::Notes(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
                Block::Decisions(text) => {
                    out.push_str("\nDecisions Made\n");
                    out.push_str(text);
                    out.push('\n');
                }
                Block::ActionRow {
                    completed,
                    task,
                    owner,
                    due_date,
                } => {
                    let mark = if *completed { "[x]" } else { "[ ]" };
                    out.push_str(&format!("  {mark} {task}"));
                    if let Some(owner) = owner {
                        out.push_str(&format!(" (owner: {owner})"));
                    }
                    if let Some(due_date) = due_date {
                        out.push_str(&format!(" (due: {due_date})"));
                    }
                    out.push('\n');
                }
            }
        }
        out
    }
}
