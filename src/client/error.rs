//! Error types for the GitLab client

use compact_str::CompactString;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by [`GitlabApi`](super::GitlabApi) calls.
///
/// Transport failures are passed through as-is: the client does not try to
/// tell an expired token from a missing project, it reports the status and
/// body GitLab sent back.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: CompactString,
        body: CompactString,
    },

    #[error("Failed to parse response for {path}: {message}: {source}")]
    JsonParse {
        path: CompactString,
        message: CompactString,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration for {field}: {message}")]
    ConfigValidation {
        field: CompactString,
        message: CompactString,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub fn status(
        status: u16,
        url: impl Into<CompactString>,
        body: impl Into<CompactString>,
    ) -> Self {
        Self::Status {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn json_parse(
        path: impl Into<CompactString>,
        message: impl Into<CompactString>,
        source: serde_json::Error,
    ) -> Self {
        Self::JsonParse {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    pub fn config_validation(
        field: impl Into<CompactString>,
        message: impl Into<CompactString>,
    ) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status code, when the failure came from a completed response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
