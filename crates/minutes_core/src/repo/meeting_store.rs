//! Meeting record store with a mirrored persistence slot.
//!
//! # Responsibility
//! - Own the ordered in-memory meeting collection.
//! - Mirror every effective mutation into one durable slot.
//!
//! # Invariants
//! - Ids are generated here and are unique across the collection.
//! - `add` prepends; collection order is otherwise insertion order.
//! - `update` and `delete` on an unknown id are silent no-ops.
//! - Domain operations never fail; only the persistence mirror can.
//! - A mutation whose persist fails is rolled back, so memory never runs
//!   ahead of the durable slot.

use crate::model::meeting::{new_opaque_id, Meeting, MeetingDraft, MeetingId, MeetingPatch};
use crate::storage::envelope::{self, EnvelopeError, PersistedState, STORAGE_KEY};
use crate::storage::{SlotStorage, StorageError};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure surfaced by store operations.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Envelope(EnvelopeError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Envelope(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Envelope(err) => Some(err),
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<EnvelopeError> for RepoError {
    fn from(value: EnvelopeError) -> Self {
        Self::Envelope(value)
    }
}

/// Repository interface for meeting CRUD operations.
pub trait MeetingRepository {
    /// Assigns a fresh id, prepends the record and returns it.
    fn add(&mut self, draft: MeetingDraft) -> RepoResult<Meeting>;
    /// Merges `patch` into the matching record. Returns whether one matched.
    fn update(&mut self, id: &str, patch: &MeetingPatch) -> RepoResult<bool>;
    /// Removes the matching record. Returns whether one matched.
    fn delete(&mut self, id: &str) -> RepoResult<bool>;
    fn get(&self, id: &str) -> Option<&Meeting>;
    /// All records in collection order.
    fn meetings(&self) -> &[Meeting];
}

/// In-memory meeting collection mirrored into a `SlotStorage` slot.
pub struct MeetingStore<S: SlotStorage> {
    storage: S,
    key: String,
    meetings: Vec<Meeting>,
}

impl<S: SlotStorage> MeetingStore<S> {
    /// Loads the collection from the default slot; empty when the slot is unset.
    pub fn load(storage: S) -> RepoResult<Self> {
        Self::load_from(storage, STORAGE_KEY, Vec::new())
    }

    /// Loads the collection from `key`.
    ///
    /// When the slot has never been written, the store starts with `seed`
    /// and persists it immediately. An existing slot is never re-seeded,
    /// even when it holds an empty collection.
    pub fn load_from(storage: S, key: impl Into<String>, seed: Vec<Meeting>) -> RepoResult<Self> {
        let key = key.into();
        let stored = storage.get_item(&key)?;
        let seeded = stored.is_none() && !seed.is_empty();

        let meetings = match stored {
            Some(raw) => envelope::decode(&raw)?.meetings,
            None => seed,
        };
        info!(
            "event=store_load module=repo status=ok key={} count={} seeded={}",
            key,
            meetings.len(),
            seeded
        );

        let store = Self {
            storage,
            key,
            meetings,
        };
        if seeded {
            store.persist()?;
        }
        Ok(store)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.meetings.iter().position(|meeting| meeting.id == id)
    }

    fn persist(&self) -> RepoResult<()> {
        let state = PersistedState {
            meetings: self.meetings.clone(),
        };
        let raw = envelope::encode(&state)?;
        self.storage.set_item(&self.key, &raw)?;
        debug!(
            "event=store_persist module=repo status=ok key={} count={} bytes={}",
            self.key,
            self.meetings.len(),
            raw.len()
        );
        Ok(())
    }
}

impl<S: SlotStorage> MeetingRepository for MeetingStore<S> {
    fn add(&mut self, draft: MeetingDraft) -> RepoResult<Meeting> {
        let mut id: MeetingId = new_opaque_id();
        while self.position(&id).is_some() {
            id = new_opaque_id();
        }

        let meeting = Meeting::new(id, draft);
        self.meetings.insert(0, meeting.clone());
        if let Err(err) = self.persist() {
            self.meetings.remove(0);
            return Err(err);
        }
        info!(
            "event=meeting_add module=repo status=ok meeting_id={}",
            meeting.id
        );
        Ok(meeting)
    }

    fn update(&mut self, id: &str, patch: &MeetingPatch) -> RepoResult<bool> {
        let Some(index) = self.position(id) else {
            debug!("event=meeting_update module=repo status=skipped reason=not_found meeting_id={id}");
            return Ok(false);
        };

        let previous = self.meetings[index].details.clone();
        patch.apply_to(&mut self.meetings[index].details);
        if let Err(err) = self.persist() {
            self.meetings[index].details = previous;
            return Err(err);
        }
        info!("event=meeting_update module=repo status=ok meeting_id={id}");
        Ok(true)
    }

    fn delete(&mut self, id: &str) -> RepoResult<bool> {
        let Some(index) = self.position(id) else {
            debug!("event=meeting_delete module=repo status=skipped reason=not_found meeting_id={id}");
            return Ok(false);
        };

        let removed = self.meetings.remove(index);
        if let Err(err) = self.persist() {
            self.meetings.insert(index, removed);
            return Err(err);
        }
        info!("event=meeting_delete module=repo status=ok meeting_id={id}");
        Ok(true)
    }

    fn get(&self, id: &str) -> Option<&Meeting> {
        self.meetings.iter().find(|meeting| meeting.id == id)
    }

    fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }
}
