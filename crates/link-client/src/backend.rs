//! Seams between the pairing flow and the protocol implementation.

use crate::error::LinkError;
use crate::types::{CredentialUpdate, Credentials, ProtocolVersion};
use async_trait::async_trait;
use std::sync::Arc;

/// Receives credential changes as a client produces them.
#[async_trait]
pub trait CredentialListener: Send + Sync {
    async fn credentials_updated(&self, update: &CredentialUpdate) -> Result<(), LinkError>;
}

/// A protocol client bound to one session's credentials.
#[async_trait]
pub trait LinkingClient: Send + Sync {
    /// Whether the session's identity has already completed linking.
    fn is_registered(&self) -> bool;

    /// Register a listener for credential updates. Listeners are notified
    /// in registration order, before the call that caused the update returns.
    fn on_credentials_update(&mut self, listener: Arc<dyn CredentialListener>);

    /// Request a pairing code for a digit-only E.164 number.
    async fn request_pairing_code(&mut self, phone_number: &str) -> Result<String, LinkError>;
}

/// Factory for linking clients.
#[async_trait]
pub trait LinkingBackend: Send + Sync {
    /// Latest protocol version known to the backend.
    async fn latest_version(&self) -> Result<ProtocolVersion, LinkError>;

    /// Construct a client for the given credentials.
    async fn connect(
        &self,
        version: ProtocolVersion,
        credentials: Credentials,
    ) -> Result<Box<dyn LinkingClient>, LinkError>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> bool;
}
