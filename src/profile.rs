//! Serializable composer settings for cross-process communication.
//!
//! A [`ComposerProfile`] captures the session's configuration in a format
//! that can be serialized to JSON and exchanged with a frontend.
//!
//! # Example
//!
//! ```
//! use overlay_composer::ComposerProfile;
//!
//! let profile = ComposerProfile::new()
//!     .with_backing_rectangle(true)
//!     .with_auto_resize_preview(false);
//!
//! let json = profile.to_json().unwrap();
//! let restored = ComposerProfile::from_json(&json).unwrap();
//! assert_eq!(restored, profile);
//! ```

use serde::{Deserialize, Serialize};

use crate::export::DEFAULT_JPEG_QUALITY;
use crate::layout::DEFAULT_OVERLAY_FRACTION;

/// Serializable composer settings.
///
/// The two render toggles are independent: the backing rectangle and the
/// auto-resizing preview can be combined freely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerProfile {
    /// Draw a semi-transparent backing rectangle behind the overlay.
    #[serde(default)]
    pub backing_rectangle: bool,

    /// Recompute the preview size on every viewport resize.
    #[serde(default = "default_true")]
    pub auto_resize_preview: bool,

    /// Overlay width as a fraction of the base image width.
    #[serde(default = "default_overlay_fraction")]
    pub overlay_fraction: f32,

    /// JPEG quality used for exports (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ComposerProfile {
    fn default() -> Self {
        Self {
            backing_rectangle: false,
            auto_resize_preview: true,
            overlay_fraction: DEFAULT_OVERLAY_FRACTION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ComposerProfile {
    /// Creates a profile with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backing_rectangle(mut self, enabled: bool) -> Self {
        self.backing_rectangle = enabled;
        self
    }

    pub fn with_auto_resize_preview(mut self, enabled: bool) -> Self {
        self.auto_resize_preview = enabled;
        self
    }

    /// Sets the overlay fraction, clamped to 0.0-1.0.
    pub fn with_overlay_fraction(mut self, fraction: f32) -> Self {
        self.overlay_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn default_true() -> bool {
    true
}

fn default_overlay_fraction() -> f32 {
    DEFAULT_OVERLAY_FRACTION
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}
