//! Linking bridge HTTP client.

use crate::backend::{CredentialListener, LinkingBackend, LinkingClient};
use crate::error::LinkError;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// REST client for the linking bridge.
#[derive(Clone)]
pub struct BridgeBackend {
    client: Client,
    base_url: String,
    browser: BrowserDescription,
}

impl BridgeBackend {
    /// Create a new bridge client. `timeout` bounds every request.
    pub fn new(
        base_url: impl Into<String>,
        browser: BrowserDescription,
        timeout: Duration,
    ) -> Result<Self, LinkError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            browser,
        })
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        operation: &str,
    ) -> Result<T, LinkError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Bridge {} failed", operation);
            return Err(LinkError::Api(format!(
                "{} failed: {} - {}",
                operation, status, body
            )));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl LinkingBackend for BridgeBackend {
    #[instrument(skip(self))]
    async fn latest_version(&self) -> Result<ProtocolVersion, LinkError> {
        let response = self
            .client
            .get(format!("{}/v1/version", self.base_url))
            .send()
            .await?;

        let version: VersionResponse = self.handle_response(response, "Version lookup").await?;
        if !version.is_latest {
            debug!(version = ?version.version, "Bridge reports a fallback protocol version");
        }

        Ok(ProtocolVersion(version.version))
    }

    async fn connect(
        &self,
        version: ProtocolVersion,
        credentials: Credentials,
    ) -> Result<Box<dyn LinkingClient>, LinkError> {
        debug!(%version, registered = credentials.registered, "Creating bridge session");

        Ok(Box::new(BridgeSession {
            backend: self.clone(),
            version,
            creds: credentials,
            listeners: Vec::new(),
        }))
    }

    async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

/// One session against the bridge.
pub struct BridgeSession {
    backend: BridgeBackend,
    version: ProtocolVersion,
    creds: Credentials,
    listeners: Vec<Arc<dyn CredentialListener>>,
}

impl BridgeSession {
    async fn emit(&self, update: CredentialUpdate) -> Result<(), LinkError> {
        for listener in &self.listeners {
            listener.credentials_updated(&update).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl LinkingClient for BridgeSession {
    fn is_registered(&self) -> bool {
        self.creds.registered
    }

    fn on_credentials_update(&mut self, listener: Arc<dyn CredentialListener>) {
        self.listeners.push(listener);
    }

    #[instrument(skip(self), fields(version = %self.version))]
    async fn request_pairing_code(&mut self, phone_number: &str) -> Result<String, LinkError> {
        if self.creds.registered {
            return Err(LinkError::AlreadyRegistered);
        }

        let request = PairingCodeRequest {
            phone_number,
            version: self.version.0,
            browser: self.backend.browser.to_wire(),
            creds: &self.creds,
        };

        let response = self
            .backend
            .client
            .post(format!("{}/v1/pairing-code", self.backend.base_url))
            .json(&request)
            .send()
            .await?;

        let pairing: PairingCodeResponse = self
            .backend
            .handle_response(response, "Pairing code request")
            .await
            .map_err(|e| match e {
                LinkError::Api(msg) => LinkError::PairingRejected(msg),
                other => other,
            })?;

        if pairing.code.trim().is_empty() {
            return Err(LinkError::PairingRejected("Bridge returned an empty code".into()));
        }

        if pairing.creds.is_some() || !pairing.keys.is_empty() {
            if let Some(creds) = pairing.creds {
                self.creds = creds;
            }
            self.emit(CredentialUpdate {
                creds: self.creds.clone(),
                keys: pairing.keys,
            })
            .await?;
        }

        debug!("Pairing code issued");
        Ok(pairing.code)
    }
}
