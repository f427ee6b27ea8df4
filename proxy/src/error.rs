//! Error types for the search proxy

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

/// Body written when a successful search response cannot be re-encoded.
pub const ENCODE_FAILURE_BODY: &str = "error in getting data";

/// Search proxy errors
///
/// Each variant maps to exactly one HTTP status. Transport failures are
/// reported as `400` rather than a gateway status.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    InvalidBody(serde_json::Error),

    #[error("{0}")]
    ClientBuild(String),

    #[error("{0}")]
    QueryEncode(serde_json::Error),

    #[error("{0}")]
    Transport(String),

    /// The cluster answered with an error status; `body` is its raw payload.
    #[error("search service returned {status}")]
    Remote { status: StatusCode, body: Bytes },

    #[error("{0}")]
    ResponseDecode(serde_json::Error),

    #[error("{0}")]
    ResponseEncode(serde_json::Error),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::Transport(_) => StatusCode::BAD_REQUEST,
            Self::ClientBuild(_)
            | Self::QueryEncode(_)
            | Self::Remote { .. }
            | Self::ResponseDecode(_)
            | Self::ResponseEncode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

fn is_json(body: &[u8]) -> bool {
    serde_json::from_slice::<serde::de::IgnoredAny>(body).is_ok()
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Remote { body, .. } => {
                let content_type = if is_json(&body) {
                    "application/json"
                } else {
                    "text/plain; charset=utf-8"
                };
                (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
            }
            Self::ResponseEncode(_) => (status, ENCODE_FAILURE_BODY).into_response(),
            other => (status, other.to_string()).into_response(),
        }
    }
}
