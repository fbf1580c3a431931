//! Host package protocol.
//!
//! The host exchanges length-prefixed packages with the module over
//! stdin/stdout. Each package carries a caller-correlation `pid`, a package
//! type and a MessagePack payload. See [`frame`] for the wire layout.

pub mod frame;

use serde::Serialize;
use thiserror::Error;

use crate::error::BridgeError;

pub use frame::{read_package, write_package, HEADER_SIZE};

/// Package types exchanged with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Proto {
    /// Host to module: credentials.
    ModuleConf = 64,
    /// Module to host: configuration accepted.
    ModuleConfOk = 65,
    /// Module to host: configuration rejected; module not usable.
    ModuleConfErr = 66,
    /// Host to module: operation request.
    ModuleReq = 80,
    /// Module to host: operation reply.
    ModuleRes = 81,
    /// Module to host: operation failure.
    ModuleErr = 82,
}

impl Proto {
    /// Maps a raw package type to a known [`Proto`].
    pub fn from_u8(tp: u8) -> Option<Self> {
        match tp {
            64 => Some(Proto::ModuleConf),
            65 => Some(Proto::ModuleConfOk),
            66 => Some(Proto::ModuleConfErr),
            80 => Some(Proto::ModuleReq),
            81 => Some(Proto::ModuleRes),
            82 => Some(Proto::ModuleErr),
            _ => None,
        }
    }
}

/// A single framed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Correlation id, echoed in the reply.
    pub pid: u16,
    /// Raw package type.
    pub tp: u8,
    /// MessagePack payload.
    pub data: Vec<u8>,
}

impl Package {
    /// Creates a package of a known type.
    pub fn new(pid: u16, proto: Proto, data: Vec<u8>) -> Self {
        Self {
            pid,
            tp: proto as u8,
            data,
        }
    }

    /// Returns the package type if it is one the module knows.
    pub fn proto(&self) -> Option<Proto> {
        Proto::from_u8(self.tp)
    }

    /// Builds a conf-ok package.
    pub fn conf_ok(pid: u16) -> Self {
        Self::new(pid, Proto::ModuleConfOk, Vec::new())
    }

    /// Builds a conf-err package.
    pub fn conf_err(pid: u16) -> Self {
        Self::new(pid, Proto::ModuleConfErr, Vec::new())
    }

    /// Builds a module-response package carrying `value`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::BadData` if the value cannot be encoded.
    pub fn response<T: Serialize + ?Sized>(pid: u16, value: &T) -> Result<Self, BridgeError> {
        let data = rmp_serde::to_vec(value)
            .map_err(|e| BridgeError::bad_data(format!("failed to pack response ({})", e)))?;
        Ok(Self::new(pid, Proto::ModuleRes, data))
    }

    /// Builds a module-error package for `err`.
    ///
    /// The payload is the array `[code, message]`.
    pub fn error(pid: u16, err: &BridgeError) -> Self {
        let message = err.to_string();
        let data = rmp_serde::to_vec(&(err.kind().code(), &message)).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to pack error payload");
            Vec::new()
        });
        Self::new(pid, Proto::ModuleErr, data)
    }
}

/// Errors raised while reading or writing packages.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header check byte does not match the package type.
    #[error("invalid package header (type {tp}, check {check})")]
    InvalidHeader {
        /// Package type from the header.
        tp: u8,
        /// Check byte from the header.
        check: u8,
    },

    /// The payload does not fit the 32-bit size field.
    #[error("package payload too large ({0} bytes)")]
    TooLarge(usize),
}
