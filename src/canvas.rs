//! HTML Canvas rendering for WASM environments.
//!
//! This module provides [`CanvasComposer`], a wrapper around
//! [`ComposerSession`] that can render directly to an HTML canvas element
//! for live preview in a web frontend.
//!
//! # Feature Flag
//!
//! This module is only available with the `wasm` feature enabled:
//!
//! ```toml
//! [dependencies]
//! overlay-composer = { version = "0.1", features = ["wasm"] }
//! ```
//!
//! # Example (JavaScript/TypeScript)
//!
//! ```javascript
//! import init, { CanvasComposer } from 'overlay-composer';
//!
//! await init();
//!
//! const composer = new CanvasComposer();
//! composer.loadBase(jpegBytes, "image/jpeg");
//! composer.loadOverlay(svgBytes, "image/svg+xml");
//!
//! // Render at native resolution; CSS sizing comes from displaySize*.
//! const canvas = document.getElementById('preview-canvas');
//! composer.renderToCanvas(canvas);
//!
//! const [w, h] = composer.displaySizeOnMount(window.innerWidth);
//! canvas.style.width = `${w}px`;
//! canvas.style.height = `${h}px`;
//!
//! // Download the composite.
//! const bytes = composer.exportJpeg();
//! ```

use wasm_bindgen::Clamped;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::export::EXPORT_FILE_NAME;
use crate::profile::ComposerProfile;
use crate::session::{ComposerSession, Configurable};

// ============================================================================
// CanvasComposer
// ============================================================================

/// A wrapper around [`ComposerSession`] for rendering to HTML canvas
/// elements.
///
/// This type is exposed to JavaScript via wasm-bindgen and provides a
/// simple API for live preview in web UIs.
#[wasm_bindgen]
pub struct CanvasComposer {
    session: ComposerSession,
}

#[wasm_bindgen]
impl CanvasComposer {
    /// Creates a composer with the default profile.
    #[wasm_bindgen(constructor)]
    pub fn new() -> CanvasComposer {
        Self {
            session: ComposerSession::new(),
        }
    }

    /// Creates a composer configured from a profile JSON string.
    #[wasm_bindgen(js_name = "fromProfileJson")]
    pub fn from_profile_json(json: &str) -> Result<CanvasComposer, JsError> {
        let profile = ComposerProfile::from_json(json)
            .map_err(|e| JsError::new(&format!("Failed to parse profile: {}", e)))?;
        Ok(Self {
            session: ComposerSession::with_profile(&profile),
        })
    }

    // ---- Asset Loading ----

    /// Loads the base photograph from raw file bytes.
    ///
    /// The declared MIME type must be exactly `image/jpeg`.
    #[wasm_bindgen(js_name = "loadBase")]
    pub fn load_base(&mut self, bytes: &[u8], declared_type: &str) -> Result<(), JsError> {
        self.session
            .load_base(bytes, declared_type)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Loads the vector overlay from raw file bytes.
    ///
    /// The declared MIME type must be exactly `image/svg+xml`.
    #[wasm_bindgen(js_name = "loadOverlay")]
    pub fn load_overlay(&mut self, bytes: &[u8], declared_type: &str) -> Result<(), JsError> {
        self.session
            .load_overlay(bytes, declared_type)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// True when the composite reflects both current assets.
    #[wasm_bindgen(js_name = "compositeReady")]
    pub fn composite_ready(&self) -> bool {
        self.session.composite_ready()
    }

    // ---- Rendering ----

    /// Runs the compositing pass and draws the result to a canvas element
    /// at the base image's native resolution.
    #[wasm_bindgen(js_name = "renderToCanvas")]
    pub fn render_to_canvas(&mut self, canvas: &HtmlCanvasElement) -> Result<(), JsError> {
        self.session
            .render()
            .map_err(|e| JsError::new(&e.to_string()))?;
        let buffer = self
            .session
            .buffer()
            .ok_or_else(|| JsError::new("Composite buffer missing"))?;

        let width = buffer.width();
        let height = buffer.height();

        // Resize canvas to the native composite size; CSS display sizing
        // is handled separately via displaySize*.
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|_| JsError::new("Failed to get 2d context"))?
            .ok_or_else(|| JsError::new("Canvas 2d context is null"))?
            .dyn_into()
            .map_err(|_| JsError::new("Failed to cast to CanvasRenderingContext2d"))?;

        let image_data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(buffer.as_raw().as_slice()),
            width,
            height,
        )
        .map_err(|_| JsError::new("Failed to create ImageData"))?;

        ctx.put_image_data(&image_data, 0.0, 0.0)
            .map_err(|_| JsError::new("Failed to put image data"))?;

        Ok(())
    }

    // ---- Preview Sizing ----

    /// Computes the CSS display size on mount as a `[width, height]` array.
    #[wasm_bindgen(js_name = "displaySizeOnMount")]
    pub fn display_size_on_mount(&mut self, window_width: f32) -> Result<js_sys::Array, JsError> {
        let size = self
            .session
            .display_size_on_mount(window_width)
            .map_err(|e| JsError::new(&e.to_string()))?;

        let arr = js_sys::Array::new();
        arr.push(&JsValue::from(size.width));
        arr.push(&JsValue::from(size.height));
        Ok(arr)
    }

    /// Recomputes the CSS display size for a viewport resize.
    ///
    /// Returns `undefined` when auto-resize is disabled or no base image
    /// is loaded.
    #[wasm_bindgen(js_name = "displaySizeOnResize")]
    pub fn display_size_on_resize(&mut self, window_width: f32) -> Option<js_sys::Array> {
        let size = self.session.display_size_on_resize(window_width)?;
        let arr = js_sys::Array::new();
        arr.push(&JsValue::from(size.width));
        arr.push(&JsValue::from(size.height));
        Some(arr)
    }

    // ---- Export ----

    /// Encodes the current composite as JPEG bytes at native resolution.
    #[wasm_bindgen(js_name = "exportJpeg")]
    pub fn export_jpeg(&self) -> Result<js_sys::Uint8Array, JsError> {
        let bytes = self
            .session
            .export_jpeg()
            .map_err(|e| JsError::new(&e.to_string()))?;

        let array = js_sys::Uint8Array::new_with_length(bytes.len() as u32);
        array.copy_from(&bytes);
        Ok(array)
    }

    /// The file name to offer for the downloaded export.
    #[wasm_bindgen(js_name = "exportFileName")]
    pub fn export_file_name() -> String {
        EXPORT_FILE_NAME.to_string()
    }

    // ---- Profile Import/Export ----

    /// Exports the current settings as a JSON string.
    #[wasm_bindgen(js_name = "exportProfileJson")]
    pub fn export_profile_json(&self) -> Result<String, JsError> {
        let profile = self.session.export_profile();
        profile
            .to_json()
            .map_err(|e| JsError::new(&format!("Failed to serialize profile: {}", e)))
    }

    /// Imports settings from a JSON string.
    #[wasm_bindgen(js_name = "importProfileJson")]
    pub fn import_profile_json(&mut self, json: &str) -> Result<(), JsError> {
        let profile = ComposerProfile::from_json(json)
            .map_err(|e| JsError::new(&format!("Failed to parse profile: {}", e)))?;
        self.session.apply_profile(&profile);
        Ok(())
    }
}

impl Default for CanvasComposer {
    fn default() -> Self {
        Self::new()
    }
}
