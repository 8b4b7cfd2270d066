//! Meeting record domain model.
//!
//! # Responsibility
//! - Define the canonical meeting record and its nested sub-lists.
//! - Derive the structured attendee list from the canonical text input.
//! - Provide partial-merge semantics for updates.
//!
//! # Invariants
//! - `id` is assigned once by the store and never changes.
//! - Sub-item ids are unique within their parent list.
//! - Attendees are stored only as `attendees_text`; the list form is always
//!   derived on read, so the two can never diverge.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique identifier of a stored meeting.
pub type MeetingId = String;

/// Opaque identifier of one agenda/action row inside a meeting.
pub type RowId = String;

/// Generates a fresh opaque identifier for meetings and sub-rows.
pub fn new_opaque_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Editorial state of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    #[default]
    Draft,
    Finalized,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "finalized" => Some(Self::Finalized),
            _ => None,
        }
    }
}

/// Ordered agenda topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub id: RowId,
    pub title: String,
    /// Free-form label such as `15m`.
    pub duration: String,
}

impl AgendaItem {
    /// Creates an empty agenda row with a fresh row id.
    pub fn blank() -> Self {
        Self::new("", "")
    }

    pub fn new(title: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            id: new_opaque_id(),
            title: title.into(),
            duration: duration.into(),
        }
    }
}

/// Task captured during a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: RowId,
    pub task: String,
    pub owner: String,
    pub due_date: String,
    pub completed: bool,
}

impl ActionItem {
    /// Creates an empty, not completed action row with a fresh row id.
    pub fn blank() -> Self {
        Self::new("", "", "")
    }

    pub fn new(
        task: impl Into<String>,
        owner: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            id: new_opaque_id(),
            task: task.into(),
            owner: owner.into(),
            due_date: due_date.into(),
            completed: false,
        }
    }
}

/// Every editable field of a meeting, without its identity.
///
/// Used for unsaved drafts and as the payload of `MeetingRepository::add`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingDraft {
    pub title: String,
    /// ISO-like local datetime, e.g. `2025-10-15T10:00`.
    pub date: String,
    /// Comma separated attendee names exactly as typed.
    pub attendees_text: String,
    pub agenda_items: Vec<AgendaItem>,
    /// Newline-significant free text.
    pub discussion_notes: String,
    pub action_items: Vec<ActionItem>,
    /// Newline-significant free text.
    pub decisions: String,
    pub status: MeetingStatus,
}

impl MeetingDraft {
    /// Structured attendee list derived from `attendees_text`.
    pub fn attendees(&self) -> Vec<String> {
        parse_attendees(&self.attendees_text)
    }
}

/// Persisted meeting record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    #[serde(flatten)]
    pub details: MeetingDraft,
}

impl Meeting {
    pub fn new(id: impl Into<MeetingId>, details: MeetingDraft) -> Self {
        Self {
            id: id.into(),
            details,
        }
    }

    pub fn attendees(&self) -> Vec<String> {
        self.details.attendees()
    }
}

/// Partial field set merged into an existing meeting.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeetingPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub attendees_text: Option<String>,
    pub agenda_items: Option<Vec<AgendaItem>>,
    pub discussion_notes: Option<String>,
    pub action_items: Option<Vec<ActionItem>>,
    pub decisions: Option<String>,
    pub status: Option<MeetingStatus>,
}

impl MeetingPatch {
    /// Builds a patch that overwrites every field with the draft's values.
    pub fn replace_all(draft: &MeetingDraft) -> Self {
        Self {
            title: Some(draft.title.clone()),
            date: Some(draft.date.clone()),
            attendees_text: Some(draft.attendees_text.clone()),
            agenda_items: Some(draft.agenda_items.clone()),
            discussion_notes: Some(draft.discussion_notes.clone()),
            action_items: Some(draft.action_items.clone()),
            decisions: Some(draft.decisions.clone()),
            status: Some(draft.status),
        }
    }

    /// Merges the present fields into `target`; last write wins.
    pub fn apply_to(&self, target: &mut MeetingDraft) {
        if let Some(title) = &self.title {
            target.title = title.clone();
        }
        if let Some(date) = &self.date {
            target.date = date.clone();
        }
        if let Some(attendees_text) = &self.attendees_text {
            target.attendees_text = attendees_text.clone();
        }
        if let Some(agenda_items) = &self.agenda_items {
            target.agenda_items = agenda_items.clone();
        }
        if let Some(discussion_notes) = &self.discussion_notes {
            target.discussion_notes = discussion_notes.clone();
        }
        if let Some(action_items) = &self.action_items {
            target.action_items = action_items.clone();
        }
        if let Some(decisions) = &self.decisions {
            target.decisions = decisions.clone();
        }
        if let Some(status) = self.status {
            target.status = status;
        }
    }
}

/// Splits comma separated attendee input into display names.
///
/// Pieces are trimmed; empty and whitespace-only pieces are dropped.
pub fn parse_attendees(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_attendees, MeetingDraft, MeetingPatch, MeetingStatus};

    #[test]
    fn parse_attendees_trims_and_drops_empty_pieces() {
        assert_eq!(
            parse_attendees("Alice,  Bob ,, Charlie"),
            vec!["Alice", "Bob", "Charlie"]
        );
        assert!(parse_attendees(" , ,").is_empty());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut draft = MeetingDraft {
            title: "Kickoff".to_string(),
            decisions: "Ship it".to_string(),
            ..MeetingDraft::default()
        };
        let patch = MeetingPatch {
            status: Some(MeetingStatus::Finalized),
            ..MeetingPatch::default()
        };
        patch.apply_to(&mut draft);

        assert_eq!(draft.title, "Kickoff");
        assert_eq!(draft.decisions, "Ship it");
        assert_eq!(draft.status, MeetingStatus::Finalized);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(MeetingStatus::parse(" Finalized "), Some(MeetingStatus::Finalized));
        assert_eq!(MeetingStatus::parse("archived"), None);
    }
}
