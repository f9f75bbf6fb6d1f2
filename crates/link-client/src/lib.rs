//! Client for a multi-device linking bridge.
//!
//! The bridge speaks the messaging protocol; this crate asks it for protocol
//! versions and pairing codes, and keeps each session's credentials on disk.

mod auth;
mod backend;
mod client;
mod error;
mod types;

pub use auth::{AuthState, FileCredentialStore};
pub use backend::{CredentialListener, LinkingBackend, LinkingClient};
pub use client::{BridgeBackend, BridgeSession};
pub use error::LinkError;
pub use types::*;
