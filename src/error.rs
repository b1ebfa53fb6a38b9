//! Error types for the record validation service
//!
//! Maps the error taxonomy onto HTTP statuses: malformed bodies and
//! semantically invalid field values are client errors with fixed wire
//! messages, anything unanticipated is a server error whose message is
//! trimmed before leaving the process.

use crate::config::ConfigError;
use crate::tracker::TrackerError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warp::http::StatusCode;

/// Main error type for request processing and startup
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Body is not a JSON object or a required key is missing
    #[error("Invalid JSON format")]
    InvalidFormat,

    /// Identifier fails the checksum
    #[error("Invalid Israeli ID")]
    InvalidId,

    /// Random number is not an integer in range
    #[error("Invalid RandomNumber format")]
    InvalidNumber,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// JSON body returned for every error response
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ServiceError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidFormat
            | ServiceError::InvalidId
            | ServiceError::InvalidNumber => StatusCode::BAD_REQUEST,
            ServiceError::Config(_) | ServiceError::Tracker(_) | ServiceError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Wire-format body for this error.
    ///
    /// Client errors carry their fixed messages verbatim; server errors are
    /// passed through [`trim_error_message`] first.
    pub fn to_error_body(&self) -> ErrorBody {
        let message = self.to_string();
        ErrorBody {
            error: if self.status_code().is_server_error() {
                trim_error_message(&message)
            } else {
                message
            },
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Longest message a 500 body will carry
const MAX_ERROR_MESSAGE_LEN: usize = 200;

// Two or more /-separated components, i.e. a filesystem path
static PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:/[A-Za-z0-9._-]+){2,}").expect("path pattern compiles"));

/// Trim a server-error message before it reaches a response body.
///
/// The 500 path here wraps config-file reads, socket binds, and tracker
/// state failures, whose messages can embed absolute filesystem paths from
/// the host. Paths are collapsed to their final component and the message
/// is capped at [`MAX_ERROR_MESSAGE_LEN`] bytes.
fn trim_error_message(message: &str) -> String {
    let mut trimmed = PATH_PATTERN
        .replace_all(message, |caps: &regex::Captures<'_>| {
            match caps[0].rsplit('/').next() {
                Some(name) if !name.is_empty() => format!(".../{name}"),
                _ => "...".to_string(),
            }
        })
        .to_string();

    if trimmed.len() > MAX_ERROR_MESSAGE_LEN {
        let mut cut = MAX_ERROR_MESSAGE_LEN;
        while !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        trimmed.truncate(cut);
        trimmed.push_str("...");
    }

    trimmed
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
