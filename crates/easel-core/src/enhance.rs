//! Client side of the remote enhancement endpoint.
//!
//! The endpoint takes the composited image as a data URI plus an optional
//! prompt and answers with a new data URI. The enhancement itself runs
//! elsewhere; this module only speaks the wire format.
//!
//! ```text
//! POST <url>  {"image": "data:image/png;base64,...", "prompt": "..."}
//! 2xx         {"image": "data:image/png;base64,..."}
//! 501         plain text: endpoint not configured
//! other       plain text error message
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP status the endpoint uses when no enhancement backend is configured.
pub const STATUS_NOT_CONFIGURED: u16 = 501;

/// Errors from an enhancement request.
#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("Enhancement is not configured: {0}")]
    NotConfigured(String),

    #[error("Enhancement service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceRequest {
    /// The composited image as a data URI.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceResponse {
    /// The enhanced image as a data URI.
    pub image: String,
}

/// Something that can enhance an image.
#[allow(async_fn_in_trait)]
pub trait Enhancer {
    /// Returns the enhanced image as a data URI.
    async fn enhance(&self, request: &EnhanceRequest) -> Result<String, EnhanceError>;
}

/// Turn a raw status and body into the enhanced image data URI.
pub fn classify_response(status: u16, body: &str) -> Result<String, EnhanceError> {
    if status == STATUS_NOT_CONFIGURED {
        return Err(EnhanceError::NotConfigured(body.trim().to_string()));
    }
    if !(200..300).contains(&status) {
        return Err(EnhanceError::Service {
            status,
            message: body.trim().to_string(),
        });
    }

    let response: EnhanceResponse = serde_json::from_str(body)?;
    if !response.image.starts_with("data:") {
        return Err(EnhanceError::InvalidResponse(
            "image field is not a data URI".to_string(),
        ));
    }
    Ok(response.image)
}

#[cfg(feature = "http")]
pub use http::HttpEnhancer;

#[cfg(feature = "http")]
mod http {
    use super::{classify_response, EnhanceError, EnhanceRequest, Enhancer};

    /// [`Enhancer`] that POSTs JSON to an HTTP endpoint.
    #[derive(Debug, Clone)]
    pub struct HttpEnhancer {
        http: reqwest::Client,
        url: String,
    }

    impl HttpEnhancer {
        pub fn new(url: impl Into<String>) -> Self {
            Self::with_client(reqwest::Client::new(), url)
        }

        pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
            Self {
                http,
                url: url.into(),
            }
        }

        /// Join a server base URL and the configured endpoint path.
        pub fn from_base(base: &str, path: &str) -> Self {
            let url = format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            );
            Self::new(url)
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    impl Enhancer for HttpEnhancer {
        async fn enhance(&self, request: &EnhanceRequest) -> Result<String, EnhanceError> {
            let resp = self.http.post(&self.url).json(request).send().await?;

            let status = resp.status();
            let body = resp.text().await?;
            tracing::debug!(url = %self.url, status = status.as_u16(), "Enhancement response");

            classify_response(status.as_u16(), &body)
        }
    }

}
