//! # DutyCalls
//!
//! A ThingsDB module that bridges module requests to the DutyCalls
//! ticketing API.
//!
//! ThingsDB sends the module a configuration package with credentials and
//! then request packages naming a handler (`new-ticket`, `get-hits`, ...).
//! Each request becomes one authenticated HTTP call; the response is
//! classified and turned back into a reply package.
//!
//! ## Architecture
//!
//! - [`config`] - Credential store and environment settings
//! - [`error`] - Error type and host exception codes
//! - [`protocol`] - Host package framing and reply payloads
//! - [`models`] - Operation parameters and API bodies
//! - [`operations`] - The operation table
//! - [`client`] - HTTP execution and response classification
//! - [`dispatcher`] - Routing of packages to the store and client
//! - [`server`] - The sequential module loop
//!
//! ## Handlers
//!
//! | Handler | HTTP | Reply |
//! |---|---|---|
//! | `new-ticket` | `POST ticket?channel=` | SID of the created ticket |
//! | `get-ticket` | `GET ticket?sid=` | matching tickets |
//! | `get-tickets` | `GET ticket` | all tickets |
//! | `close-ticket`, `unack-ticket` | `PUT ticket/status?sid=` | nil |
//! | `close-tickets`, `unack-tickets` | `PUT ticket/status?sid=..&sid=..` | nil |
//! | `new-hit` | `POST ticket/hit?sid=` | nil |
//! | `get-hits` | `GET ticket/hit?sid=` | hits |
//!
//! ## Example
//!
//! Running a request without the package loop:
//!
//! ```ignore
//! use dutycalls::client::DutyCallsClient;
//! use dutycalls::config::{CredentialStore, Settings};
//! use dutycalls::dispatcher::Dispatcher;
//!
//! async fn example(conf: &[u8], request: &[u8]) -> Result<(), dutycalls::error::BridgeError> {
//!     let client = DutyCallsClient::new(&Settings::from_env()?)?;
//!     let store = CredentialStore::new();
//!     store.configure(conf)?;
//!
//!     let reply = Dispatcher::new(store, client).dispatch(request).await?;
//!     println!("{:?}", reply);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod operations;
pub mod protocol;
pub mod server;
