//! Top-level editor error.

use thiserror::Error;

use crate::backend::RenderError;
use crate::data_uri::DataUriError;
use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::enhance::EnhanceError;
use crate::matte::MatteError;
use crate::operation::OperationKind;
use crate::scene::OverlayId;

/// Errors returned by [`crate::Editor`] operations.
///
/// None of these leave the scene partially modified.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Another image-replacing operation is in flight.
    #[error("Editor is busy: {0} in progress")]
    Busy(OperationKind),

    #[error("No image loaded")]
    NoImage,

    #[error("A crop selection already exists")]
    CropInProgress,

    #[error("No crop selection")]
    NoSelection,

    #[error("No overlay with id {0}")]
    UnknownOverlay(OverlayId),

    /// The overlay exists but is not the kind the operation expects.
    #[error("Overlay {0} is not a text box")]
    NotText(OverlayId),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Matte(#[from] MatteError),

    #[error(transparent)]
    Enhance(#[from] EnhanceError),

    #[error(transparent)]
    DataUri(#[from] DataUriError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
