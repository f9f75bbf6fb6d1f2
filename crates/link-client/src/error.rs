//! Linking bridge client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Credential storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Pairing rejected: {0}")]
    PairingRejected(String),

    #[error("Account already registered")]
    AlreadyRegistered,
}
