//! The owning session controller.
//!
//! [`ComposerSession`] replaces ambient mutable state with one struct that
//! owns the asset store, the compositor, the viewport presenter, and the
//! readiness flag. All gating lives here: rendering requires both assets,
//! exporting requires a successful render.

use image::RgbaImage;
use tracing::debug;

use crate::asset::Bitmap;
use crate::compositor::{Compositor, RenderSettings};
use crate::error::{ComposeError, ComposeResult};
use crate::export;
use crate::profile::ComposerProfile;
use crate::store::{AssetStore, LoadOutcome, LoadTicket};
use crate::viewport::{DisplaySize, ViewportPresenter};

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from a [`ComposerProfile`].
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    fn apply_profile(&mut self, profile: &ComposerProfile);

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> ComposerProfile;
}

// ============================================================================
// ComposerSession
// ============================================================================

/// Main compositing session.
///
/// Invariant: [`composite_ready`](Self::composite_ready) is true exactly
/// when both assets are present and the most recent render completed
/// without error. Replacing either asset clears it; the next successful
/// render sets it again.
///
/// # Example
///
/// ```
/// use overlay_composer::{ComposerProfile, ComposerSession};
///
/// let profile = ComposerProfile::new().with_backing_rectangle(true);
/// let session = ComposerSession::with_profile(&profile);
///
/// // Export stays gated until both assets are loaded and rendered.
/// assert!(!session.composite_ready());
/// assert!(session.export_jpeg().is_err());
/// ```
pub struct ComposerSession {
    store: AssetStore,
    compositor: Compositor,
    presenter: ViewportPresenter,
    settings: RenderSettings,
    jpeg_quality: u8,
    composite_ready: bool,
}

impl Default for ComposerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposerSession {
    /// Creates a session with the default profile.
    pub fn new() -> Self {
        Self::with_profile(&ComposerProfile::default())
    }

    /// Creates a session configured from a profile.
    pub fn with_profile(profile: &ComposerProfile) -> Self {
        Self {
            store: AssetStore::new(),
            compositor: Compositor::new(),
            presenter: ViewportPresenter::new(profile.auto_resize_preview),
            settings: RenderSettings {
                backing_rectangle: profile.backing_rectangle,
                overlay_fraction: profile.overlay_fraction.clamp(0.0, 1.0),
            },
            jpeg_quality: profile.jpeg_quality,
            composite_ready: false,
        }
    }

    /// Read access to the asset slots.
    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// True when the buffer reflects both current assets.
    pub fn composite_ready(&self) -> bool {
        self.composite_ready
    }

    /// The buffer from the most recent successful render.
    pub fn buffer(&self) -> Option<&RgbaImage> {
        self.compositor.buffer()
    }

    // ---- Asset loading ----

    /// Loads the base photograph; clears readiness on success.
    pub fn load_base(&mut self, bytes: &[u8], declared_type: &str) -> ComposeResult<()> {
        let ticket = self.store.begin_base_load();
        self.complete_base_load(ticket, bytes, declared_type)
            .map(|_| ())
    }

    /// Loads the vector overlay; clears readiness on success.
    pub fn load_overlay(&mut self, bytes: &[u8], declared_type: &str) -> ComposeResult<()> {
        let ticket = self.store.begin_overlay_load();
        self.complete_overlay_load(ticket, bytes, declared_type)
            .map(|_| ())
    }

    /// Starts an asynchronous base load.
    pub fn begin_base_load(&mut self) -> LoadTicket {
        self.store.begin_base_load()
    }

    /// Starts an asynchronous overlay load.
    pub fn begin_overlay_load(&mut self) -> LoadTicket {
        self.store.begin_overlay_load()
    }

    /// Applies a finished base decode. A superseded completion leaves the
    /// session untouched, readiness included.
    pub fn complete_base_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
        declared_type: &str,
    ) -> ComposeResult<LoadOutcome> {
        let outcome = self.store.complete_base_load(ticket, bytes, declared_type)?;
        if outcome == LoadOutcome::Applied {
            self.composite_ready = false;
        }
        Ok(outcome)
    }

    /// Applies a finished overlay parse. A superseded completion leaves
    /// the session untouched, readiness included.
    pub fn complete_overlay_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
        declared_type: &str,
    ) -> ComposeResult<LoadOutcome> {
        let outcome = self
            .store
            .complete_overlay_load(ticket, bytes, declared_type)?;
        if outcome == LoadOutcome::Applied {
            self.composite_ready = false;
        }
        Ok(outcome)
    }

    // ---- Rendering and export ----

    /// Runs the full compositing pass.
    ///
    /// Fails with [`ComposeError::NotReady`] while either asset is absent
    /// (the buffer is untouched in that case). On any later failure the
    /// buffer is discarded and readiness stays false.
    pub fn render(&mut self) -> ComposeResult<&RgbaImage> {
        let base = self
            .store
            .base()
            .ok_or(ComposeError::NotReady("base image not loaded"))?;
        let overlay = self
            .store
            .overlay()
            .ok_or(ComposeError::NotReady("overlay not loaded"))?;

        self.composite_ready = false;
        let buffer = self.compositor.render(base, overlay, &self.settings)?;
        self.composite_ready = true;
        debug!("composite ready");
        Ok(buffer)
    }

    /// Encodes the current composite as JPEG bytes.
    ///
    /// Fails with [`ComposeError::NotReady`] unless a render has succeeded
    /// since the assets last changed.
    pub fn export_jpeg(&self) -> ComposeResult<Vec<u8>> {
        if !self.composite_ready {
            return Err(ComposeError::NotReady("composite not rendered"));
        }
        let buffer = self
            .compositor
            .buffer()
            .ok_or(ComposeError::NotReady("composite buffer missing"))?;
        export::encode_jpeg(buffer, self.jpeg_quality)
    }

    // ---- Preview sizing ----

    /// Preview size on mount; requires the base image for its aspect
    /// ratio.
    pub fn display_size_on_mount(&mut self, window_width: f32) -> ComposeResult<DisplaySize> {
        let natural = self
            .store
            .base()
            .map(Bitmap::size)
            .ok_or(ComposeError::NotReady("base image not loaded"))?;
        Ok(self.presenter.on_mount(window_width, natural))
    }

    /// Preview size on a viewport resize. `None` when the base image is
    /// absent or auto-resize is disabled.
    pub fn display_size_on_resize(&mut self, window_width: f32) -> Option<DisplaySize> {
        let natural = self.store.base()?.size();
        self.presenter.on_resize(window_width, natural)
    }
}

impl Configurable for ComposerSession {
    fn apply_profile(&mut self, profile: &ComposerProfile) {
        self.settings.backing_rectangle = profile.backing_rectangle;
        self.settings.overlay_fraction = profile.overlay_fraction.clamp(0.0, 1.0);
        self.presenter.set_auto_resize(profile.auto_resize_preview);
        self.jpeg_quality = profile.jpeg_quality;
        // Settings changed; the buffer no longer reflects them.
        self.composite_ready = false;
    }

    fn export_profile(&self) -> ComposerProfile {
        ComposerProfile {
            backing_rectangle: self.settings.backing_rectangle,
            auto_resize_preview: self.presenter.auto_resize(),
            overlay_fraction: self.settings.overlay_fraction,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BASE_MIME, OVERLAY_MIME};
    use std::io::Cursor;

    const OVERLAY_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"><rect width="200" height="100" fill="#0000ff"/></svg>"##;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([180, 40, 40]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    fn loaded_session() -> ComposerSession {
        let mut session = ComposerSession::new();
        session.load_base(&jpeg_bytes(100, 80), BASE_MIME).unwrap();
        session.load_overlay(OVERLAY_SVG, OVERLAY_MIME).unwrap();
        session
    }

    #[test]
    fn render_requires_both_assets() {
        let mut session = ComposerSession::new();
        session.load_base(&jpeg_bytes(100, 80), BASE_MIME).unwrap();

        let err = session.render().unwrap_err();
        assert!(matches!(err, ComposeError::NotReady(_)));
        assert!(session.buffer().is_none(), "failed gate must not touch the buffer");
        assert!(!session.composite_ready());
    }

    #[test]
    fn export_gated_until_rendered() {
        let mut session = loaded_session();
        assert!(matches!(
            session.export_jpeg().unwrap_err(),
            ComposeError::NotReady(_)
        ));

        session.render().unwrap();
        assert!(session.composite_ready());

        let bytes = session.export_jpeg().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded =
            image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 80));
    }

    #[test]
    fn render_sets_buffer_to_native_size() {
        let mut session = loaded_session();
        let buf = session.render().unwrap();
        assert_eq!(buf.dimensions(), (100, 80));
    }

    #[test]
    fn replacing_an_asset_clears_readiness() {
        let mut session = loaded_session();
        session.render().unwrap();
        assert!(session.composite_ready());

        session.load_base(&jpeg_bytes(64, 48), BASE_MIME).unwrap();
        assert!(!session.composite_ready());
        assert!(matches!(
            session.export_jpeg().unwrap_err(),
            ComposeError::NotReady(_)
        ));

        // Rendering again restores readiness at the new native size.
        session.render().unwrap();
        let bytes = session.export_jpeg().unwrap();
        let decoded =
            image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn rejected_upload_keeps_readiness() {
        let mut session = loaded_session();
        session.render().unwrap();

        let err = session.load_base(OVERLAY_SVG, "image/svg+xml").unwrap_err();
        assert!(matches!(err, ComposeError::UnsupportedAssetType { .. }));
        assert!(session.composite_ready(), "no state change on rejection");
    }

    #[test]
    fn superseded_completion_keeps_readiness() {
        let mut session = loaded_session();
        session.render().unwrap();

        let stale = session.begin_overlay_load();
        let _current = session.begin_overlay_load();
        let outcome = session
            .complete_overlay_load(stale, OVERLAY_SVG, OVERLAY_MIME)
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert!(session.composite_ready());
    }

    #[test]
    fn display_size_follows_base_aspect() {
        let mut session = ComposerSession::new();
        assert!(session.display_size_on_mount(1200.0).is_err());

        session.load_base(&jpeg_bytes(1000, 800), BASE_MIME).unwrap();
        let size = session.display_size_on_mount(1200.0).unwrap();
        assert_eq!(size.width, 600.0);
        assert!((size.height - 480.0).abs() < 1e-3);

        let size = session.display_size_on_resize(800.0).unwrap();
        assert_eq!(size.width, 400.0);
    }

    #[test]
    fn resize_ignored_when_profile_disables_it() {
        let profile = ComposerProfile::new().with_auto_resize_preview(false);
        let mut session = ComposerSession::with_profile(&profile);
        session.load_base(&jpeg_bytes(1000, 800), BASE_MIME).unwrap();

        session.display_size_on_mount(1200.0).unwrap();
        assert!(session.display_size_on_resize(800.0).is_none());
    }

    #[test]
    fn profile_round_trip() {
        let profile = ComposerProfile::new()
            .with_backing_rectangle(true)
            .with_auto_resize_preview(false)
            .with_jpeg_quality(80);

        let mut session = ComposerSession::new();
        session.apply_profile(&profile);
        assert_eq!(session.export_profile(), profile);
    }

    #[test]
    fn applying_a_profile_clears_readiness() {
        let mut session = loaded_session();
        session.render().unwrap();

        session.apply_profile(&ComposerProfile::new().with_backing_rectangle(true));
        assert!(!session.composite_ready());

        session.render().unwrap();
        assert!(session.composite_ready());
    }

    #[test]
    fn backing_rectangle_changes_rendered_output() {
        // Circle overlay keeps placement corners transparent so the
        // backing fill is visible; the two sessions differ only in the
        // backing toggle.
        let circle: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><circle cx="50" cy="50" r="40" fill="#00ff00"/></svg>"##;

        let mut plain = ComposerSession::new();
        plain.load_base(&jpeg_bytes(100, 80), BASE_MIME).unwrap();
        plain.load_overlay(circle, OVERLAY_MIME).unwrap();
        let plain_buf = plain.render().unwrap().clone();

        let profile = ComposerProfile::new().with_backing_rectangle(true);
        let mut backed = ComposerSession::with_profile(&profile);
        backed.load_base(&jpeg_bytes(100, 80), BASE_MIME).unwrap();
        backed.load_overlay(circle, OVERLAY_MIME).unwrap();
        let backed_buf = backed.render().unwrap().clone();

        assert_eq!(plain_buf.dimensions(), backed_buf.dimensions());
        assert_ne!(plain_buf.as_raw(), backed_buf.as_raw());
    }
}
