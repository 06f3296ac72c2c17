//! Error taxonomy for asset loading, layout, compositing, and export.

/// Crate-wide result alias.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Errors produced by the compositing pipeline.
///
/// All variants are recoverable at the boundary where they occur: a bad
/// upload is reported and the session keeps its previous state, and a
/// gated operation ([`NotReady`](ComposeError::NotReady)) simply has to
/// wait for its prerequisites.
#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    /// The declared MIME type does not match what the slot accepts.
    #[error("unsupported asset type: expected `{expected}`, got `{declared}`")]
    UnsupportedAssetType {
        /// The exact MIME type the asset slot accepts.
        expected: &'static str,
        /// The MIME type the upload declared.
        declared: String,
    },

    /// The asset bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The asset has no usable geometry (for example a zero-width overlay,
    /// for which the aspect-ratio division is undefined).
    #[error("degenerate asset: {0}")]
    DegenerateAsset(String),

    /// A render or export was attempted before its prerequisites were met.
    #[error("not ready: {0}")]
    NotReady(&'static str),

    /// The composite buffer could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
}

impl ComposeError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateAsset(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
