//! Pairing Proxy - issues multi-device pairing codes over HTTP.
//!
//! A caller posts a phone number; the proxy normalizes it, opens a throwaway
//! session against the linking bridge and returns the pairing code the phone
//! needs to link itself to that session.

pub mod api;
pub mod config;
pub mod error;
pub mod phone;
pub mod session;

pub use config::Config;
pub use error::ProxyError;
pub use phone::{NormalizedNumber, PhoneNormalizer};
pub use session::{SessionDir, SessionId};
