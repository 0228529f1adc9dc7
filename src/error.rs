//! Error types for the session client
//!
//! Every failure a user action can hit maps onto one of these variants, and
//! every variant maps onto exactly one notice text.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Text shown for any request that could not complete
pub const NETWORK_ERROR: &str = "Network error occurred";

/// Main error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (connect, DNS, TLS, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("Request rejected with {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected {
        status: StatusCode,
        detail: Option<String>,
    },

    /// 401 from an authenticated endpoint, or no token to send
    #[error("Not authenticated")]
    Unauthorized,

    /// A 2xx response whose body did not match the expected shape
    #[error("Could not decode response body: {0}")]
    Decode(String),

    /// Divide with a zero second operand, caught before sending
    #[error("Cannot divide by zero")]
    DivideByZero,

    /// The user left a prompt empty or declined a confirmation
    #[error("Cancelled by user")]
    Cancelled,

    /// Durable token storage could not be read or written
    #[error("Token storage error at {path}: {message}")]
    Storage { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Notice text for this error, using `fallback` when the server gave no detail.
    ///
    /// Transport and decode failures never expose technical detail.
    pub fn notice_text(&self, fallback: &str) -> String {
        match self {
            ClientError::Transport(_) | ClientError::Decode(_) => NETWORK_ERROR.to_string(),
            ClientError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ClientError::DivideByZero => "Cannot divide by zero!".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Status code carried by a server rejection
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        ClientError::Storage {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
