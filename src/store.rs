//! Asset slots for the base photograph and the vector overlay.
//!
//! Each slot carries a generation counter so that decode completions from
//! a superseded upload are dropped instead of clobbering a newer asset.
//! The host decodes asynchronously relative to the file-selection event;
//! either slot's decode may finish first or be replaced mid-flight, and
//! only the completion matching the slot's current generation is applied.

use tracing::{debug, warn};

use crate::asset::{Bitmap, VectorAsset};
use crate::error::{ComposeError, ComposeResult};

/// Exact MIME type accepted for the base photograph.
pub const BASE_MIME: &str = "image/jpeg";

/// Exact MIME type accepted for the vector overlay.
pub const OVERLAY_MIME: &str = "image/svg+xml";

/// Outcome of completing an asset load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The decoded asset replaced the slot's contents.
    Applied,
    /// A newer load was started for this slot; the completion was dropped
    /// without decoding or touching state.
    Superseded,
}

/// Token tying a decode completion to the load that started it.
#[derive(Debug, Clone, Copy)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug)]
struct Slot<T> {
    asset: Option<T>,
    generation: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            asset: None,
            generation: 0,
        }
    }
}

impl<T> Slot<T> {
    fn begin(&mut self) -> LoadTicket {
        self.generation = self.generation.wrapping_add(1);
        LoadTicket {
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }
}

// ============================================================================
// AssetStore
// ============================================================================

/// Holds the two decoded input assets and their load state.
///
/// Uploads are gated on an exact declared MIME type match before any
/// decoding happens; a mismatch or a decode failure leaves the slot
/// exactly as it was.
#[derive(Debug, Default)]
pub struct AssetStore {
    base: Slot<Bitmap>,
    overlay: Slot<VectorAsset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The decoded base photograph, if one has been loaded.
    pub fn base(&self) -> Option<&Bitmap> {
        self.base.asset.as_ref()
    }

    /// The parsed overlay, if one has been loaded.
    pub fn overlay(&self) -> Option<&VectorAsset> {
        self.overlay.asset.as_ref()
    }

    /// True when both assets are present and compositing may run.
    pub fn both_present(&self) -> bool {
        self.base.asset.is_some() && self.overlay.asset.is_some()
    }

    // ---- Base slot ----

    /// Loads the base photograph in one step (begin + complete).
    pub fn load_base(&mut self, bytes: &[u8], declared_type: &str) -> ComposeResult<()> {
        let ticket = self.begin_base_load();
        self.complete_base_load(ticket, bytes, declared_type)
            .map(|_| ())
    }

    /// Starts a base load, superseding any load still in flight.
    pub fn begin_base_load(&mut self) -> LoadTicket {
        self.base.begin()
    }

    /// Applies a finished base decode if its ticket is still current.
    pub fn complete_base_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
        declared_type: &str,
    ) -> ComposeResult<LoadOutcome> {
        if !self.base.is_current(ticket) {
            warn!("dropping superseded base load");
            return Ok(LoadOutcome::Superseded);
        }

        check_declared_type(declared_type, BASE_MIME)?;
        let bitmap = Bitmap::decode_jpeg(bytes)?;
        debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            "base image loaded"
        );
        self.base.asset = Some(bitmap);
        Ok(LoadOutcome::Applied)
    }

    // ---- Overlay slot ----

    /// Loads the vector overlay in one step (begin + complete).
    pub fn load_overlay(&mut self, bytes: &[u8], declared_type: &str) -> ComposeResult<()> {
        let ticket = self.begin_overlay_load();
        self.complete_overlay_load(ticket, bytes, declared_type)
            .map(|_| ())
    }

    /// Starts an overlay load, superseding any load still in flight.
    pub fn begin_overlay_load(&mut self) -> LoadTicket {
        self.overlay.begin()
    }

    /// Applies a finished overlay parse if its ticket is still current.
    pub fn complete_overlay_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
        declared_type: &str,
    ) -> ComposeResult<LoadOutcome> {
        if !self.overlay.is_current(ticket) {
            warn!("dropping superseded overlay load");
            return Ok(LoadOutcome::Superseded);
        }

        check_declared_type(declared_type, OVERLAY_MIME)?;
        let overlay = VectorAsset::parse(bytes)?;
        debug!("overlay loaded");
        self.overlay.asset = Some(overlay);
        Ok(LoadOutcome::Applied)
    }
}

fn check_declared_type(declared: &str, expected: &'static str) -> ComposeResult<()> {
    if declared != expected {
        return Err(ComposeError::UnsupportedAssetType {
            expected,
            declared: declared.to_string(),
        });
    }
    Ok(())
}
