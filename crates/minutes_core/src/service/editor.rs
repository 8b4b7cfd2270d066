//! Headless meeting detail/edit form.
//!
//! # Responsibility
//! - Resolve a route into a new draft or a copy of an existing record.
//! - Edit repeatable agenda/action rows addressed by row id, not index.
//! - Write the draft back on submit and delete only after confirmation.
//!
//! # Invariants
//! - The store is untouched until `submit` or a confirmed `delete`.
//! - Removing a row never changes the identity or content of its siblings.
//! - An unknown id resolves to a redirect to the list, not an error.

use crate::model::dates::to_input_value;
use crate::model::meeting::{
    ActionItem, AgendaItem, MeetingDraft, MeetingId, MeetingPatch, MeetingStatus, RowId,
};
use crate::notify::{Notification, Notifier};
use crate::repo::meeting_store::{MeetingRepository, RepoResult};
use crate::service::routing::Route;
use chrono::NaiveDateTime;
use log::debug;

const DELETE_PROMPT: &str = "Are you sure you want to delete this meeting?";

/// Whether the form edits a fresh draft or a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    New,
    Existing(MeetingId),
}

/// Where the UI should go after an editor action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    GoTo(Route),
}

/// Result of opening the editor for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Editing(MeetingEditor),
    Redirect(Route),
}

/// Explicit yes/no step before destructive actions.
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything; for non-interactive callers that already asked.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Form state for one meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingEditor {
    mode: EditorMode,
    draft: MeetingDraft,
}

impl MeetingEditor {
    /// Empty draft dated `now`, with one blank agenda row and no actions.
    pub fn new_draft(now: NaiveDateTime) -> Self {
        Self {
            mode: EditorMode::New,
            draft: MeetingDraft {
                date: to_input_value(now),
                agenda_items: vec![AgendaItem::blank()],
                status: MeetingStatus::Draft,
                ..MeetingDraft::default()
            },
        }
    }

    /// Resolves `route` to an editor.
    ///
    /// The list route and unknown ids redirect to the list.
    pub fn open<R: MeetingRepository + ?Sized>(
        route: &Route,
        repo: &R,
        now: NaiveDateTime,
    ) -> OpenOutcome {
        match route {
            Route::NewMeeting => OpenOutcome::Editing(Self::new_draft(now)),
            Route::Meeting(id) => match repo.get(id) {
                Some(meeting) => OpenOutcome::Editing(Self {
                    mode: EditorMode::Existing(meeting.id.clone()),
                    draft: meeting.details.clone(),
                }),
                None => {
                    debug!("event=editor_open module=service status=redirect reason=not_found meeting_id={id}");
                    OpenOutcome::Redirect(Route::List)
                }
            },
            Route::List => OpenOutcome::Redirect(Route::List),
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn is_new(&self) -> bool {
        self.mode == EditorMode::New
    }

    pub fn draft(&self) -> &MeetingDraft {
        &self.draft
    }

    /// Scalar fields are bound directly.
    pub fn draft_mut(&mut self) -> &mut MeetingDraft {
        &mut self.draft
    }

    /// Header title: "New Meeting" for drafts, else the title or a fallback.
    pub fn heading(&self) -> &str {
        if self.is_new() {
            "New Meeting"
        } else if self.draft.title.trim().is_empty() {
            "Untitled Meeting"
        } else {
            &self.draft.title
        }
    }

    /// Header subtitle: "Draft" until first saved, then the finalized
    /// marker or the edit stamp.
    pub fn status_label(&self) -> &'static str {
        match (self.is_new(), self.draft.status) {
            (true, _) => "Draft",
            (false, MeetingStatus::Finalized) => "Finalized",
            (false, MeetingStatus::Draft) => "Last edited just now",
        }
    }

    /// Only stored meetings can be exported.
    pub fn can_export(&self) -> bool {
        !self.is_new()
    }

    pub fn append_agenda_item(&mut self) -> RowId {
        let row = AgendaItem::blank();
        let id = row.id.clone();
        self.draft.agenda_items.push(row);
        id
    }

    pub fn agenda_item_mut(&mut self, row_id: &str) -> Option<&mut AgendaItem> {
        self.draft.agenda_items.iter_mut().find(|row| row.id == row_id)
    }

    /// Removes one agenda row. Returns whether it existed.
    pub fn remove_agenda_item(&mut self, row_id: &str) -> bool {
        let before = self.draft.agenda_items.len();
        self.draft.agenda_items.retain(|row| row.id != row_id);
        self.draft.agenda_items.len() != before
    }

    pub fn append_action_item(&mut self) -> RowId {
        let row = ActionItem::blank();
        let id = row.id.clone();
        self.draft.action_items.push(row);
        id
    }

    pub fn action_item_mut(&mut self, row_id: &str) -> Option<&mut ActionItem> {
        self.draft.action_items.iter_mut().find(|row| row.id == row_id)
    }

    /// Removes one action row. Returns whether it existed.
    pub fn remove_action_item(&mut self, row_id: &str) -> bool {
        let before = self.draft.action_items.len();
        self.draft.action_items.retain(|row| row.id != row_id);
        self.draft.action_items.len() != before
    }

    /// Flips an action row's completed flag without submitting.
    ///
    /// Returns the new state, or `None` for an unknown row.
    pub fn toggle_action_item(&mut self, row_id: &str) -> Option<bool> {
        let row = self.action_item_mut(row_id)?;
        row.completed = !row.completed;
        Some(row.completed)
    }

    /// Saves the draft.
    ///
    /// New drafts are added and navigate to the list; the editor then
    /// tracks the stored record. Existing records are merged in place and
    /// the editor stays open.
    pub fn submit<R, N>(&mut self, repo: &mut R, notifier: &N) -> RepoResult<Navigation>
    where
        R: MeetingRepository + ?Sized,
        N: Notifier + ?Sized,
    {
        match &self.mode {
            EditorMode::New => {
                let created = repo.add(self.draft.clone())?;
                self.mode = EditorMode::Existing(created.id);
                notifier.notify(Notification::success(
                    "Meeting Created",
                    "Your meeting notes have been started.",
                ));
                Ok(Navigation::GoTo(Route::List))
            }
            EditorMode::Existing(id) => {
                repo.update(id, &MeetingPatch::replace_all(&self.draft))?;
                notifier.notify(Notification::success("Saved", "Meeting updated successfully."));
                Ok(Navigation::Stay)
            }
        }
    }

    /// Deletes the record after `confirmer` agrees.
    ///
    /// Declining stays on the page. Confirming on a new draft only leaves.
    pub fn delete<R, C>(&self, repo: &mut R, confirmer: &C) -> RepoResult<Navigation>
    where
        R: MeetingRepository + ?Sized,
        C: Confirmer + ?Sized,
    {
        if !confirmer.confirm(DELETE_PROMPT) {
            return Ok(Navigation::Stay);
        }
        if let EditorMode::Existing(id) = &self.mode {
            repo.delete(id)?;
        }
        Ok(Navigation::GoTo(Route::List))
    }
}
