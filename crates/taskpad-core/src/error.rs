//! Remote task API errors
//!
//! Typed errors for calls to the task server. These carry the diagnostic
//! detail (status code, transport error) that goes to the log; users only
//! ever see the fixed per-operation messages from [`Operation`].

use thiserror::Error;

/// Errors that can occur while talking to the task server
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request never produced a response (connection refused, DNS, reset...)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// Successful status but the body was not a valid task payload
    #[error("Invalid response from server: {0}")]
    Decode(#[source] reqwest::Error),

    /// Configured API base URL can't be used
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport-level failure, including unreadable responses
    NetworkFailure,
    /// Non-2xx status
    ServerError,
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Network(_) | ApiError::Decode(_) | ApiError::InvalidUrl { .. } => {
                FailureKind::NetworkFailure
            }
            ApiError::Server { .. } => FailureKind::ServerError,
        }
    }

    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The three synchronizer operations, each with its own failure message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Toggle,
}

impl Operation {
    /// Fixed user-facing message shown when this operation fails
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Load => "Failed to fetch tasks. Make sure the task server is running.",
            Operation::Create => "Failed to add task. Please try again.",
            Operation::Toggle => "Failed to update task. Please try again.",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Toggle => "toggle",
        }
    }
}
