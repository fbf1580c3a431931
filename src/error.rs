//! Error types for the DutyCalls module.
//!
//! This module defines `BridgeError`, the unified error type used throughout
//! the module, and `ErrorKind`, the caller-visible classification that is
//! reported back to the host.
//!
//! # Security
//!
//! Transport errors may echo request details. Use `sanitize_message()` to
//! strip the configured password before a message leaves the process.

use thiserror::Error;

/// Host exception codes used in module-error packages.
pub mod codes {
    /// The operation could not be performed (transport failure).
    pub const OPERATION: i8 = -63;
    /// Invalid or unexpected data.
    pub const BAD_DATA: i8 = -53;
}

/// Caller-visible error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed payloads, unknown handlers, decode failures.
    BadData,
    /// The outbound HTTP call could not be executed.
    Operation,
    /// The HTTP exchange completed with a rejected status code.
    Upstream,
}

impl ErrorKind {
    /// Returns the host exception code for this kind.
    ///
    /// Upstream failures are reported to the host as bad data.
    #[must_use]
    pub fn code(self) -> i8 {
        match self {
            ErrorKind::BadData | ErrorKind::Upstream => codes::BAD_DATA,
            ErrorKind::Operation => codes::OPERATION,
        }
    }
}

/// Unified error type for all module operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Inbound payload, handler name, or JSON body could not be handled.
    #[error("{0}")]
    BadData(String),

    /// The HTTP request could not be performed.
    #[error("failed to perform the request ({0})")]
    Operation(String),

    /// The upstream service answered with a status outside the accepted range.
    #[error("{body} ({status})")]
    Upstream {
        /// Numeric HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// Invalid module configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Creates a bad data error.
    pub fn bad_data(message: impl Into<String>) -> Self {
        BridgeError::BadData(message.into())
    }

    /// Creates an upstream status error.
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        BridgeError::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Creates a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        BridgeError::Config(message.into())
    }

    /// Returns the caller-visible kind of this error.
    ///
    /// Configuration errors never reach an operation reply; they are
    /// classified as bad data should one be rendered anyway.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::BadData(_) | BridgeError::Config(_) => ErrorKind::BadData,
            BridgeError::Operation(_) => ErrorKind::Operation,
            BridgeError::Upstream { .. } => ErrorKind::Upstream,
        }
    }

    /// Returns the upstream status code, if this error carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Replaces every occurrence of `secret` in `message` with `[REDACTED]`.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::BadData(format!("failed to unpack response ({})", err))
    }
}
