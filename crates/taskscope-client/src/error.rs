//! Error types for the task service client.

use reqwest::StatusCode;
use thiserror::Error;

/// Error code the index and queue return for unknown resources.
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFound";

/// Errors that can occur when talking to the task service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection, TLS, body read, redirects).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error document.
    #[error("service error {status} ({code}): {message}")]
    Service {
        status: StatusCode,
        code: String,
        message: String,
    },

    /// Non-2xx response without a decodable error document.
    #[error("HTTP {status} for url: {url}")]
    Status { status: StatusCode, url: String },

    /// Response body did not match the expected shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Downloaded bytes are not a valid zip archive.
    #[error("corrupt artifact: {0}")]
    CorruptArtifact(#[from] zip::result::ZipError),

    /// Local file error while writing or checking an artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every download attempt failed; carries the last failure.
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// Returns true for the service's "resource not found" answer.
    pub fn is_resource_not_found(&self) -> bool {
        matches!(self, Self::Service { code, .. } if code == RESOURCE_NOT_FOUND)
    }

    /// HTTP status behind this error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Service { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}
