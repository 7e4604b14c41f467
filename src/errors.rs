/*!
 * Error types for the anchorsync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to an entry-matcher API
#[derive(Error, Debug)]
pub enum MatcherError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl MatcherError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// Network failures and 5xx responses are worth another attempt;
    /// authentication errors and 4xx responses are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Fatal errors for a synchronization run
#[derive(Error, Debug)]
pub enum SyncError {
    /// Reference track parsed to zero entries
    #[error("Reference subtitle is empty")]
    EmptyReference,

    /// Target track parsed to zero entries
    #[error("Target subtitle is empty")]
    EmptyTarget,

    /// Fewer than two anchors survived matching and curation
    #[error("Not enough anchor points found ({found}). Cannot build reliable time mapping.")]
    NotEnoughAnchors {
        /// Number of anchors that survived
        found: usize,
    },

    /// A timestamp or subtitle file that cannot be parsed at all
    #[error("Subtitle format error: {0}")]
    Format(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the entry matcher
    #[error("Matcher error: {0}")]
    Matcher(#[from] MatcherError),

    /// Fatal synchronization error
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
