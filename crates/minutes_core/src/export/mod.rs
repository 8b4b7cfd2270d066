//! Meeting export to a paginated PDF download.
//!
//! # Responsibility
//! - Compose the static fragment for a draft and mount it off-screen.
//! - Rasterize, paginate and write `<title>.pdf` into the download directory.
//! - Report progress, success and failure as notifications.
//!
//! # Invariants
//! - At most one export per meeting is in flight; a second request gets
//!   `ExportError::Busy` instead of racing.
//! - The off-screen surface is unmounted on success and on every failure.
//! - Export reads the draft only; it never touches the store.

pub mod markup;
pub mod pdf;
pub mod raster;
pub mod surface;

use crate::model::meeting::{MeetingDraft, MeetingId};
use crate::notify::{Notification, Notifier};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use self::markup::compose;
use self::pdf::{assemble, PageGeometry};
use self::raster::{RasterOptions, Rasterizer};
use self::surface::{MountedSurface, SurfaceHost};

/// File stem used when the meeting has no title.
pub const DEFAULT_FILE_STEM: &str = "meeting-minutes";

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("valid file name regex"));

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    /// An export for this meeting is already running.
    Busy(MeetingId),
    Font(String),
    Raster(String),
    /// Rasterization produced a zero-sized bitmap.
    EmptyBitmap,
    Encode(String),
    Assembly(String),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy(id) => write!(f, "an export for meeting {id} is already in progress"),
            Self::Font(message) => write!(f, "font error: {message}"),
            Self::Raster(message) => write!(f, "rasterization failed: {message}"),
            Self::EmptyBitmap => write!(f, "rasterization produced an empty image"),
            Self::Encode(message) => write!(f, "image encoding failed: {message}"),
            Self::Assembly(message) => write!(f, "document assembly failed: {message}"),
            Self::Io(err) => write!(f, "could not write export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// A written export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub page_count: usize,
}

/// Download file name for a meeting title.
pub fn export_file_name(title: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(title.trim(), "_");
    let stem = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if stem.is_empty() {
        format!("{DEFAULT_FILE_STEM}.pdf")
    } else {
        format!("{stem}.pdf")
    }
}

/// Toast reported when an export fails, including failures that happen
/// before the pipeline starts (such as loading fonts).
pub fn failure_notification(err: &ExportError) -> Notification {
    Notification::error("Error", format!("Failed to generate PDF: {err}"))
}

/// Marks one meeting's export as in flight until dropped.
#[derive(Debug)]
pub struct ExportTicket<'a> {
    in_flight: &'a Mutex<HashSet<MeetingId>>,
    meeting_id: MeetingId,
}

impl Drop for ExportTicket<'_> {
    fn drop(&mut self) {
        lock_set(self.in_flight).remove(&self.meeting_id);
    }
}

fn lock_set(set: &Mutex<HashSet<MeetingId>>) -> std::sync::MutexGuard<'_, HashSet<MeetingId>> {
    match set.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Export pipeline bound to a rasterizer, a notifier and a download directory.
pub struct ExportService<R: Rasterizer, N: Notifier> {
    rasterizer: R,
    notifier: N,
    download_dir: PathBuf,
    geometry: PageGeometry,
    options: RasterOptions,
    host: SurfaceHost,
    in_flight: Mutex<HashSet<MeetingId>>,
}

impl<R: Rasterizer, N: Notifier> ExportService<R, N> {
    pub fn new(rasterizer: R, notifier: N, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            rasterizer,
            notifier,
            download_dir: download_dir.into(),
            geometry: PageGeometry::A4,
            options: RasterOptions::default(),
            host: SurfaceHost::new(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Surfaces currently mounted by this service.
    pub fn surface_host(&self) -> &SurfaceHost {
        &self.host
    }

    pub fn is_exporting(&self, meeting_id: &str) -> bool {
        lock_set(&self.in_flight).contains(meeting_id)
    }

    /// Claims the per-meeting export slot.
    pub fn try_begin(&self, meeting_id: &str) -> ExportResult<ExportTicket<'_>> {
        let mut in_flight = lock_set(&self.in_flight);
        if !in_flight.insert(meeting_id.to_string()) {
            return Err(ExportError::Busy(meeting_id.to_string()));
        }
        Ok(ExportTicket {
            in_flight: &self.in_flight,
            meeting_id: meeting_id.to_string(),
        })
    }

    /// Exports `draft` as `<title>.pdf` into the download directory.
    pub fn export(&self, meeting_id: &str, draft: &MeetingDraft) -> ExportResult<ExportArtifact> {
        let ticket = match self.try_begin(meeting_id) {
            Ok(ticket) => ticket,
            Err(err) => {
                warn!("event=export module=export status=busy meeting_id={meeting_id}");
                self.notifier.notify(Notification::info(
                    "Export in progress",
                    "A PDF for this meeting is already being generated.",
                ));
                return Err(err);
            }
        };

        let started_at = Instant::now();
        info!("event=export module=export status=start meeting_id={meeting_id}");
        let mounted = self.host.mount(compose(draft));
        self.notifier.notify(Notification::info(
            "Generating PDF...",
            "Please wait while we prepare your download.",
        ));

        let result = self.render_and_save(&mounted, draft);
        drop(mounted);
        drop(ticket);

        match &result {
            Ok(artifact) => {
                info!(
                    "event=export module=export status=ok meeting_id={meeting_id} pages={} duration_ms={}",
                    artifact.page_count,
                    started_at.elapsed().as_millis()
                );
                self.notifier
                    .notify(Notification::success("Success", "PDF downloaded successfully."));
            }
            Err(err) => {
                error!(
                    "event=export module=export status=error meeting_id={meeting_id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                self.notifier.notify(failure_notification(err));
            }
        }
        result
    }

    fn render_and_save(
        &self,
        mounted: &MountedSurface<'_>,
        draft: &MeetingDraft,
    ) -> ExportResult<ExportArtifact> {
        let bitmap = self.rasterizer.rasterize(mounted.surface(), &self.options)?;
        let document = assemble(&bitmap, &self.geometry)?;

        let file_name = export_file_name(&draft.title);
        std::fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(&file_name);
        std::fs::write(&path, &document.bytes)?;

        Ok(ExportArtifact {
            path,
            file_name,
            page_count: document.page_count,
        })
    }
}
