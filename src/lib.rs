//! overlay-composer: photo + vector overlay compositing library
//!
//! This crate composes a raster photograph with an SVG overlay and exports
//! the result as a single JPEG at the photograph's native resolution. The
//! overlay is scaled to a fixed fraction of the base width (aspect ratio
//! preserved), centered, and optionally backed by a semi-transparent
//! rectangle.
//!
//! The pipeline runs in ordered passes: blit the base photograph, fill the
//! optional backing rectangle, then composite the rasterized overlay at
//! full opacity. Every render fully re-executes the passes into a buffer
//! sized to the base image; the on-screen preview is a separate display
//! transform that never touches that buffer.
//!
//! # Example
//!
//! ```
//! use overlay_composer::{ComposerProfile, ComposerSession, Configurable};
//!
//! let profile = ComposerProfile::new()
//!     .with_backing_rectangle(true)
//!     .with_auto_resize_preview(false);
//! let session = ComposerSession::with_profile(&profile);
//!
//! // Rendering and export are gated until both assets are loaded:
//! // session.load_base(&jpeg_bytes, "image/jpeg")?;
//! // session.load_overlay(&svg_bytes, "image/svg+xml")?;
//! // session.render()?;
//! // let jpeg = session.export_jpeg()?;
//! assert!(!session.composite_ready());
//! assert!(session.export_jpeg().is_err());
//!
//! // Settings round-trip as a serializable profile.
//! let json = session.export_profile().to_json().unwrap();
//! assert!(json.contains("backingRectangle"));
//! ```
//!
//! # Asynchronous uploads
//!
//! Hosts that decode file bytes asynchronously should use the ticket API
//! ([`ComposerSession::begin_base_load`] /
//! [`ComposerSession::complete_base_load`] and the overlay equivalents):
//! each slot carries a generation counter, and a completion whose ticket
//! has been superseded by a newer upload is dropped without touching
//! state.

mod asset;
mod compositor;
mod error;
mod export;
mod layout;
mod profile;
mod session;
mod store;
mod svg;
mod viewport;

#[cfg(feature = "wasm")]
mod canvas;

pub use asset::{Bitmap, SizeF, SizePx, VectorAsset};
#[cfg(feature = "wasm")]
pub use canvas::CanvasComposer;
pub use compositor::{Compositor, RenderSettings};
pub use error::{ComposeError, ComposeResult};
pub use export::{DEFAULT_JPEG_QUALITY, EXPORT_FILE_NAME, encode_jpeg};
pub use layout::{DEFAULT_OVERLAY_FRACTION, Placement, compute_placement};
pub use profile::ComposerProfile;
pub use session::{ComposerSession, Configurable};
pub use store::{AssetStore, BASE_MIME, LoadOutcome, LoadTicket, OVERLAY_MIME};
pub use viewport::{DisplaySize, ViewportPresenter, display_size};
