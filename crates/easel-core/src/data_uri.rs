//! `data:` URI encoding for images sent to and from the enhancement endpoint.
//!
//! Only the base64 form is produced: `data:<mime>;base64,<payload>`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Errors when parsing a data URI.
#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("Not a data URI")]
    MissingScheme,

    #[error("Data URI has no ',' separator")]
    MissingSeparator,

    #[error("Data URI is not base64 encoded")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Build a base64 data URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Parse a base64 data URI.
///
/// The MIME type may be empty and may carry extra parameters
/// (`image/png;charset=x;base64`); parameters other than `base64` are dropped.
pub fn decode_data_uri(uri: &str) -> Result<DataUri, DataUriError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or(DataUriError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingSeparator)?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_string();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(DataUriError::NotBase64);
    }

    let bytes = STANDARD.decode(payload.trim())?;
    Ok(DataUri { mime, bytes })
}
