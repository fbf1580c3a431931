//! Package dispatch.
//!
//! The `Dispatcher` turns one inbound package into at most one outbound
//! package. Configuration packages update the credential store; request
//! packages are routed through the operation table to the client.

use crate::client::DutyCallsClient;
use crate::config::CredentialStore;
use crate::error::BridgeError;
use crate::models::Envelope;
use crate::operations::{Handler, Reply};
use crate::protocol::{Package, Proto};

/// Whether the host has sent an accepted configuration yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No configuration accepted; requests run with default credentials.
    Unconfigured,
    /// At least one configuration accepted.
    Configured,
}

/// Routes host packages to the credential store and the API client.
pub struct Dispatcher {
    store: CredentialStore,
    client: DutyCallsClient,
    state: State,
}

impl Dispatcher {
    /// Creates a dispatcher in the [`State::Unconfigured`] state.
    pub fn new(store: CredentialStore, client: DutyCallsClient) -> Self {
        Self {
            store,
            client,
            state: State::Unconfigured,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Handles one inbound package and returns the reply to send, if any.
    pub async fn handle_package(&mut self, pkg: Package) -> Option<Package> {
        match pkg.proto() {
            Some(Proto::ModuleConf) => Some(self.configure(&pkg)),
            Some(Proto::ModuleReq) => Some(match self.dispatch(&pkg.data).await {
                Ok(reply) => Package::response(pkg.pid, &reply)
                    .unwrap_or_else(|e| Package::error(pkg.pid, &e)),
                Err(e) => {
                    tracing::error!(pid = pkg.pid, error = %e, "Request failed");
                    Package::error(pkg.pid, &e)
                }
            }),
            _ => {
                tracing::error!(tp = pkg.tp, "Unexpected package type");
                None
            }
        }
    }

    /// Applies a module-conf package and returns conf-ok or conf-err.
    pub fn configure(&mut self, pkg: &Package) -> Package {
        match self.store.configure(&pkg.data) {
            Ok(()) => {
                self.state = State::Configured;
                tracing::info!(uri = %self.store.current().uri, "DutyCalls module configured");
                Package::conf_ok(pkg.pid)
            }
            Err(e) => {
                tracing::error!(error = %e, "Missing or invalid DutyCalls configuration");
                Package::conf_err(pkg.pid)
            }
        }
    }

    /// Decodes a module-request payload, performs the operation and
    /// returns its reply.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::BadData` for an undecodable payload or a
    /// missing or unknown handler, and otherwise whatever the client returns.
    pub async fn dispatch(&self, data: &[u8]) -> Result<Reply, BridgeError> {
        let envelope: Envelope = rmp_serde::from_slice(data)
            .map_err(|_| BridgeError::bad_data("failed to unpack DutyCalls request"))?;

        let name = envelope
            .handler
            .ok_or_else(|| BridgeError::bad_data("missing handler"))?;
        let handler = Handler::from_name(&name)
            .ok_or_else(|| BridgeError::bad_data(format!("unknown handler: {}", name)))?;

        if self.state == State::Unconfigured {
            tracing::warn!(%handler, "Request received before configuration");
        }

        let op = handler.build(data)?;
        tracing::debug!(%handler, "Dispatching request");

        let creds = self.store.current();
        self.client.invoke(&creds, &op).await
    }
}
