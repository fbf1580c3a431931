//! Data models for the DutyCalls module.
//!
//! This module contains the operation parameters decoded from host
//! requests and the JSON bodies exchanged with the DutyCalls API.

mod params;
mod ticket;

pub use params::*;
pub use ticket::*;
