//! Off-screen rasterization surfaces.
//!
//! A surface is a detached, fixed-width, white container holding one export
//! fragment. It is never shown to the user and exists only while an export
//! runs.
//!
//! # Invariants
//! - A surface is unmounted when its `MountedSurface` is dropped, on every
//!   exit path including errors and panics.

use super::markup::ExportDocument;
use image::Rgb;
use log::debug;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Nominal page width of the surface in CSS pixels, padding included.
pub const SURFACE_WIDTH_PX: u32 = 800;
/// Padding on every side in CSS pixels.
pub const SURFACE_PADDING_PX: u32 = 40;
/// Surface background; export never inherits an interactive theme.
pub const SURFACE_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

pub type SurfaceId = u64;

/// Detached container handed to a rasterizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSurface {
    pub id: SurfaceId,
    pub width_px: u32,
    pub padding_px: u32,
    pub background: Rgb<u8>,
    pub document: ExportDocument,
}

impl RenderSurface {
    /// Width available to content, in CSS pixels.
    pub fn content_width_px(&self) -> u32 {
        self.width_px.saturating_sub(2 * self.padding_px)
    }
}

/// Tracks which surfaces are currently mounted.
#[derive(Debug, Default)]
pub struct SurfaceHost {
    next_id: AtomicU64,
    mounted: Mutex<BTreeSet<SurfaceId>>,
}

impl SurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a new surface for `document`.
    pub fn mount(&self, document: ExportDocument) -> MountedSurface<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.with_mounted(|mounted| {
            mounted.insert(id);
        });
        debug!("event=export_surface module=export status=mounted surface_id={id}");

        MountedSurface {
            host: self,
            surface: RenderSurface {
                id,
                width_px: SURFACE_WIDTH_PX,
                padding_px: SURFACE_PADDING_PX,
                background: SURFACE_BACKGROUND,
                document,
            },
        }
    }

    pub fn is_mounted(&self, id: SurfaceId) -> bool {
        let mut found = false;
        self.with_mounted(|mounted| found = mounted.contains(&id));
        found
    }

    pub fn mounted_count(&self) -> usize {
        let mut count = 0;
        self.with_mounted(|mounted| count = mounted.len());
        count
    }

    fn unmount(&self, id: SurfaceId) {
        self.with_mounted(|mounted| {
            mounted.remove(&id);
        });
        debug!("event=export_surface module=export status=unmounted surface_id={id}");
    }

    fn with_mounted(&self, f: impl FnOnce(&mut BTreeSet<SurfaceId>)) {
        // A poisoned set is still structurally valid.
        let mut guard = match self.mounted.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
    }
}

/// Mounted surface; unmounts itself on drop.
#[derive(Debug)]
pub struct MountedSurface<'host> {
    host: &'host SurfaceHost,
    surface: RenderSurface,
}

impl MountedSurface<'_> {
    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }
}

impl Drop for MountedSurface<'_> {
    fn drop(&mut self) {
        self.host.unmount(self.surface.id);
    }
}

#[cfg(test)]
mod tests {
    use super::SurfaceHost;
    use crate::export::markup::ExportDocument;

    #[test]
    fn dropping_a_surface_unmounts_it() {
        let host = SurfaceHost::new();
        let mounted = host.mount(ExportDocument::default());
        let id = mounted.surface().id;
        assert!(host.is_mounted(id));
        assert_eq!(mounted.surface().content_width_px(), 720);

        drop(mounted);
        assert!(!host.is_mounted(id));
        assert_eq!(host.mounted_count(), 0);
    }
}
