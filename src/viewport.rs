//! Display sizing for the on-screen preview.
//!
//! The preview element is always half the viewport width with the base
//! image's aspect ratio preserved. This is purely a display transform:
//! the native-resolution composite buffer is never touched.

use crate::asset::SizePx;

/// On-screen size of the preview element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

/// Computes the preview size for a viewport width and the base image's
/// natural size: half the window width, height scaled to keep the base
/// aspect ratio.
pub fn display_size(window_width: f32, natural: SizePx) -> DisplaySize {
    let width = window_width * 0.5;
    let height = natural.height as f32 * (width / natural.width as f32);
    DisplaySize { width, height }
}

/// Tracks the preview size across mount and resize events.
///
/// Mounting always computes a size. Resize events recompute only while
/// `auto_resize` is enabled; when it is disabled the last computed size is
/// kept until the next mount.
#[derive(Debug, Default)]
pub struct ViewportPresenter {
    auto_resize: bool,
    current: Option<DisplaySize>,
}

impl ViewportPresenter {
    pub fn new(auto_resize: bool) -> Self {
        Self {
            auto_resize,
            current: None,
        }
    }

    pub fn auto_resize(&self) -> bool {
        self.auto_resize
    }

    pub fn set_auto_resize(&mut self, enabled: bool) {
        self.auto_resize = enabled;
    }

    /// The most recently computed size, if any.
    pub fn current(&self) -> Option<DisplaySize> {
        self.current
    }

    /// Computes the preview size on mount/activation.
    pub fn on_mount(&mut self, window_width: f32, natural: SizePx) -> DisplaySize {
        let size = display_size(window_width, natural);
        self.current = Some(size);
        size
    }

    /// Recomputes the preview size for a viewport resize.
    ///
    /// Returns `None` (keeping the current size) when auto-resize is
    /// disabled.
    pub fn on_resize(&mut self, window_width: f32, natural: SizePx) -> Option<DisplaySize> {
        if !self.auto_resize {
            return None;
        }
        let size = display_size(window_width, natural);
        self.current = Some(size);
        Some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_window_width_aspect_preserved() {
        let size = display_size(1200.0, SizePx::new(1000, 800));
        assert_eq!(size.width, 600.0);
        assert!((size.height - 480.0).abs() < 1e-3, "height = {}", size.height);
    }

    #[test]
    fn mount_always_computes() {
        let mut presenter = ViewportPresenter::new(false);
        assert!(presenter.current().is_none());

        let size = presenter.on_mount(1200.0, SizePx::new(1000, 800));
        assert_eq!(size.width, 600.0);
        assert_eq!(presenter.current(), Some(size));
    }

    #[test]
    fn resize_tracks_window_when_enabled() {
        let mut presenter = ViewportPresenter::new(true);
        presenter.on_mount(1200.0, SizePx::new(1000, 800));

        let size = presenter.on_resize(800.0, SizePx::new(1000, 800)).unwrap();
        assert_eq!(size.width, 400.0);
        assert!((size.height - 320.0).abs() < 1e-3);
        assert_eq!(presenter.current(), Some(size));
    }

    #[test]
    fn resize_ignored_when_disabled() {
        let mut presenter = ViewportPresenter::new(false);
        let mounted = presenter.on_mount(1200.0, SizePx::new(1000, 800));

        assert!(presenter.on_resize(800.0, SizePx::new(1000, 800)).is_none());
        assert_eq!(presenter.current(), Some(mounted));
    }
}
