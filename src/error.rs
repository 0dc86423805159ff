//! Error types
//!
//! Errors raised while building management API URLs and executing requests.

use thiserror::Error;

use crate::http::{HttpError, HttpRequestConfig};

/// Management API client errors
#[derive(Error, Debug)]
pub enum MapiError {
    /// Two mutually exclusive request options were both supplied
    #[error("{0}")]
    OptionConflict(String),

    /// A required request option is missing
    #[error("{0}")]
    MissingOption(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("The user is not logged in.")]
    Unauthenticated,

    #[error("The authorization credential has expired.")]
    CredentialExpired,

    /// A list endpoint never returned a collection
    #[error("getListResource request took too long to complete.")]
    ListFetchTimeout {
        request: Box<HttpRequestConfig>,
        status: u16,
    },

    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("Invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl MapiError {
    /// HTTP status code attached to this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            MapiError::ListFetchTimeout { status, .. } => Some(*status),
            MapiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Whether a caller should send the user back through login
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            MapiError::Unauthenticated | MapiError::CredentialExpired
        )
    }
}
