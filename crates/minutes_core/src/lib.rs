//! Core domain logic for Minutes, a meeting-minutes workspace.
//! This crate is the single source of truth for business invariants: the
//! meeting store, list and editor view state, persistence, and PDF export.

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod sample;
pub mod service;
pub mod storage;

pub use config::{ConfigError, MinutesConfig};
pub use export::raster::{GlyphRasterizer, Rasterizer};
pub use export::{
    export_file_name, failure_notification, ExportArtifact, ExportError, ExportResult,
    ExportService,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::meeting::{
    parse_attendees, ActionItem, AgendaItem, Meeting, MeetingDraft, MeetingId, MeetingPatch,
    MeetingStatus,
};
pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier};
pub use repo::{MeetingRepository, MeetingStore, RepoError, RepoResult};
pub use service::editor::{Confirmer, EditorMode, MeetingEditor, Navigation, OpenOutcome};
pub use service::list_view::{build_list_view, MeetingListRow, MeetingListView};
pub use service::routing::Route;
pub use storage::{MemorySlotStorage, SlotStorage, SqliteSlotStorage, StorageError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
