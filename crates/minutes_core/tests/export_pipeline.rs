use image::{Rgb, RgbImage};
use minutes_core::export::markup::{compose, Block};
use minutes_core::export::raster::{Bitmap, RasterOptions};
use minutes_core::export::surface::{RenderSurface, SurfaceHost, SURFACE_WIDTH_PX};
use minutes_core::sample::sample_meetings;
use minutes_core::{
    ExportError, ExportResult, ExportService, GlyphRasterizer, MeetingDraft, Notification,
    NotificationLevel, Notifier, Rasterizer,
};
use std::cell::RefCell;

#[derive(Default)]
struct RecordingNotifier {
    seen: RefCell<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.borrow_mut().push(notification);
    }
}

/// Returns a blank bitmap of a fixed size and remembers what it was shown.
struct FixedRasterizer {
    width: u32,
    height: u32,
    last_surface: RefCell<Option<RenderSurface>>,
}

impl FixedRasterizer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            last_surface: RefCell::new(None),
        }
    }
}

impl Rasterizer for FixedRasterizer {
    fn rasterize(&self, surface: &RenderSurface, options: &RasterOptions) -> ExportResult<Bitmap> {
        *self.last_surface.borrow_mut() = Some(surface.clone());
        Ok(RgbImage::from_pixel(self.width, self.height, options.background))
    }
}

struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(&self, _surface: &RenderSurface, _options: &RasterOptions) -> ExportResult<Bitmap> {
        Err(ExportError::Raster("canvas unavailable".to_string()))
    }
}

fn titled(title: &str) -> MeetingDraft {
    MeetingDraft {
        title: title.to_string(),
        date: "2026-10-18T09:00".to_string(),
        ..MeetingDraft::default()
    }
}

#[test]
fn tall_image_is_split_across_pages_and_downloaded_by_title() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    // 210 px wide maps 1 px to 1 mm; 742 mm is about 2.5 A4 pages.
    let service = ExportService::new(FixedRasterizer::new(210, 742), &notifier, dir.path());

    let artifact = service.export("m1", &titled("Q4 Review")).unwrap();

    assert_eq!(artifact.file_name, "Q4 Review.pdf");
    assert_eq!(artifact.path, dir.path().join("Q4 Review.pdf"));
    assert_eq!(artifact.page_count, 3);

    let pdf = lopdf::Document::load(&artifact.path).unwrap();
    assert_eq!(pdf.get_pages().len(), 3);

    let seen = notifier.seen.borrow();
    assert_eq!(seen.first().unwrap().title, "Generating PDF...");
    assert_eq!(seen.last().unwrap().level, NotificationLevel::Success);
    assert_eq!(seen.last().unwrap().description, "PDF downloaded successfully.");
    assert_eq!(service.surface_host().mounted_count(), 0);
}

#[test]
fn rasterizer_sees_a_fixed_width_white_surface_with_composed_content() {
    let dir = tempfile::tempdir().unwrap();
    let rasterizer = FixedRasterizer::new(1600, 400);
    let service = ExportService::new(&rasterizer, RecordingNotifier::default(), dir.path());

    service.export("m1", &titled("Retro")).unwrap();

    let surface = rasterizer.last_surface.borrow().clone().unwrap();
    assert_eq!(surface.width_px, SURFACE_WIDTH_PX);
    assert_eq!(surface.background, Rgb([255, 255, 255]));
    assert_eq!(surface.document, compose(&titled("Retro")));
    assert_eq!(surface.document.blocks[0], Block::Title("Retro".to_string()));
    assert!(!service.surface_host().is_mounted(surface.id));
}

#[test]
fn failed_rasterization_reports_error_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let service = ExportService::new(FailingRasterizer, &notifier, dir.path());

    let error = service.export("m1", &titled("Broken")).unwrap_err();

    assert!(matches!(error, ExportError::Raster(_)));
    assert_eq!(service.surface_host().mounted_count(), 0);
    assert!(!service.is_exporting("m1"));
    assert!(!dir.path().join("Broken.pdf").exists());

    let seen = notifier.seen.borrow();
    let last = seen.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.title, "Error");
    assert_eq!(
        last.description,
        "Failed to generate PDF: rasterization failed: canvas unavailable"
    );
}

#[test]
fn empty_bitmap_is_an_export_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = ExportService::new(
        FixedRasterizer::new(0, 0),
        RecordingNotifier::default(),
        dir.path(),
    );

    assert!(matches!(
        service.export("m1", &titled("Nothing")),
        Err(ExportError::EmptyBitmap)
    ));
}

#[test]
fn second_export_of_same_meeting_is_rejected_while_first_is_in_flight() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let service = ExportService::new(FixedRasterizer::new(210, 100), &notifier, dir.path());

    let ticket = service.try_begin("m1").unwrap();
    assert!(service.is_exporting("m1"));

    let busy = service.export("m1", &titled("Busy"));
    assert!(matches!(busy, Err(ExportError::Busy(ref id)) if id == "m1"));
    assert!(!dir.path().join("Busy.pdf").exists());
    assert_eq!(service.surface_host().mounted_count(), 0);

    service.export("m2", &titled("Other")).unwrap();

    drop(ticket);
    let artifact = service.export("m1", &titled("Busy")).unwrap();
    assert_eq!(artifact.page_count, 1);
}

#[test]
fn untitled_meeting_uses_default_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let service = ExportService::new(
        FixedRasterizer::new(210, 100),
        RecordingNotifier::default(),
        dir.path().join("downloads"),
    );

    let artifact = service.export("m1", &titled("   ")).unwrap();

    assert_eq!(artifact.file_name, "meeting-minutes.pdf");
    assert!(dir.path().join("downloads/meeting-minutes.pdf").exists());
}

#[test]
fn glyph_rasterizer_renders_at_double_width_when_fonts_exist() {
    let Ok(rasterizer) = GlyphRasterizer::discover(None, None) else {
        // No system font in this environment.
        return;
    };

    let host = SurfaceHost::new();
    let mounted = host.mount(compose(&sample_meetings()[0].details));
    let bitmap = rasterizer
        .rasterize(mounted.surface(), &RasterOptions::default())
        .unwrap();

    assert_eq!(bitmap.width(), SURFACE_WIDTH_PX * 2);
    assert!(bitmap.height() > 0);
    assert_eq!(*bitmap.get_pixel(0, 0), Rgb([255, 255, 255]));
    assert!(bitmap.pixels().any(|pixel| *pixel != Rgb([255, 255, 255])));
}

#[test]
fn sample_meeting_composes_every_section_in_document_order() {
    let draft = &sample_meetings()[0].details;
    let document = compose(draft);

    let agenda_row = |number: usize, title: &str, duration: &str| Block::AgendaRow {
        number,
        title: title.to_string(),
        duration: duration.to_string(),
    };
    let action_row = |task: &str, owner: &str, due_date: &str| Block::ActionRow {
        completed: false,
        task: task.to_string(),
        owner: Some(owner.to_string()),
        due_date: Some(due_date.to_string()),
    };

    assert_eq!(
        document.blocks,
        vec![
            Block::Title("Q4 Product Strategy Review".to_string()),
            Block::Meta {
                label: "Date",
                value: "October 15, 2025 10:00 AM".to_string(),
            },
            Block::Meta {
                label: "Attendees",
                value: "Alice Chen, Bob Smith, Charlie Davis".to_string(),
            },
            Block::SectionHeading("Agenda"),
            agenda_row(1, "Review Q3 Metrics", "15m"),
            agenda_row(2, "Q4 Roadmap Brainstorm", "30m"),
            agenda_row(3, "Resource Allocation", "15m"),
            Block::SectionHeading("Discussion Notes"),
            Block::Notes(draft.discussion_notes.clone()),
            Block::Decisions(
                "1. Prioritize \"Project Falcon\" over \"Project Eagle\".\n2. Approve budget for 2 new hires."
                    .to_string()
            ),
            Block::SectionHeading("Action Items"),
            action_row("Finalize Q4 roadmap document", "Alice Chen", "2025-10-20"),
            action_row("Hire 2 senior backend engineers", "Charlie Davis", "2025-11-01"),
        ]
    );

    let Block::Notes(notes) = &document.blocks[8] else {
        panic!("expected discussion notes at block 8");
    };
    assert!(notes.starts_with("Alice presented the Q3 metrics."));
    assert!(notes.contains("Churn has decreased slightly.\n\nBob raised concerns"));
}
