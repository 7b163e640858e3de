//! Error types for yt-dash

use thiserror::Error;

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation errors
    Missing,
    TooLong,
    SuspiciousContent,
    FormatInvalid,

    // Fetch errors
    ChannelNotFound,
    UnexpectedError,

    // Upstream errors
    NetworkError,
    ApiError,
    ParseError,

    // System errors
    FileError,
    InvalidConfig,
    SpawnError,
}

/// Why a credential string was rejected before any network call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Both API Key and Channel ID are required.")]
    Missing,

    #[error("Input is too long. Please enter a valid API Key and Channel ID.")]
    TooLong,

    #[error("Input contains disallowed characters or tokens.")]
    SuspiciousContent,

    #[error("{0} format invalid.")]
    FormatInvalid(crate::types::CredentialKind),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Missing => ErrorCode::Missing,
            Self::TooLong => ErrorCode::TooLong,
            Self::SuspiciousContent => ErrorCode::SuspiciousContent,
            Self::FormatInvalid(_) => ErrorCode::FormatInvalid,
        }
    }

    /// Longer hint for the format case, shown under the error line
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::FormatInvalid(crate::types::CredentialKind::ApiKey) => {
                Some("Ensure you pasted the correct YouTube Data API key.")
            }
            Self::FormatInvalid(crate::types::CredentialKind::ChannelId) => Some(
                "Channel IDs start with 'UC' and are 24 characters long.",
            ),
            _ => None,
        }
    }
}

/// Failure of a whole fetch. Messages are deliberately generic; the cause
/// only goes to the diagnostic log.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    #[error("Could not fetch channel info. Please check your API Key and Channel ID.")]
    ChannelNotFound,

    #[error("An unexpected error occurred while fetching data. Please try again later.")]
    Unexpected,
}

impl FetchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ChannelNotFound => ErrorCode::ChannelNotFound,
            Self::Unexpected => ErrorCode::UnexpectedError,
        }
    }
}

/// Internal error type for upstream calls and local IO
#[derive(Error, Debug)]
pub enum DashError {
    #[error("HTTP error")]
    Http(#[source] reqwest::Error),

    #[error("YouTube API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Editor failed: {0}")]
    Editor(String),
}

// Request URLs carry the API key, so it must never reach a Display impl.
impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl DashError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Api { .. } => ErrorCode::ApiError,
            Self::Json(_) => ErrorCode::ParseError,
            Self::File(_) => ErrorCode::FileError,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::Editor(_) => ErrorCode::SpawnError,
        }
    }

    /// Message plus every underlying cause, for the diagnostic log
    pub fn chain(&self) -> String {
        error_chain(self)
    }
}

/// Join an error and its `source()` chain with ": "
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

pub type Result<T> = std::result::Result<T, DashError>;
