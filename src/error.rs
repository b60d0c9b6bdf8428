//! Error types shared across the crate.
//!
//! Every failure here is recoverable: the store turns them into toasts and
//! returns to an idle state. Only the binary boundary uses `anyhow`.

use thiserror::Error;

use crate::store::OpKind;

/// A required draft field was empty after trimming.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("email is required")]
    MissingEmail,
}

/// Network or HTTP failure talking to the user service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        /// Message extracted from the error body, when the server sent one.
        message: Option<String>,
    },

    /// The body of a successful response could not be read.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    /// Best-effort message for the user: the server's own message when it
    /// sent one, otherwise the error's display text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.trim().to_string(),
            _ => self.to_string(),
        }
    }
}

/// The user list response decoded fine but had no recognizable shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized user list response: expected array or object, got {found}")]
pub struct MalformedResponse {
    pub found: &'static str,
}

/// Failure of a store operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{0} already in progress")]
    Busy(OpKind),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
