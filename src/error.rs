// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for crumbline
//!
//! Two kinds of failure reach callers: the server answered with a status
//! that is neither 2xx nor 302 ([`Error::Http`]), or the request never got
//! a usable answer (transport failures and aborts). The remaining variants
//! cover bad input caught before anything is sent.

use thiserror::Error;

/// Result type alias for crumbline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for crumbline
#[derive(Error, Debug)]
pub enum Error {
    /// Server answered with a non-2xx, non-302 status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network-level failure (DNS, connect, body read)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request was aborted through its handle
    #[error("Request aborted")]
    Aborted,

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Header name or value could not be encoded
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Error::Http {
            status,
            body: body.into(),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if the request failed below the HTTP layer
    ///
    /// Aborts count as transport failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Aborted)
    }

    /// Check if this error came from an abort
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted)
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Http { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Http { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the response body of an HTTP status error
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
