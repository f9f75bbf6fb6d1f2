//! Linking bridge types.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Multi-device protocol version, as `[major, minor, patch]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion(pub [u32; 3]);

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch] = self.0;
        write!(f, "{}.{}.{}", major, minor, patch)
    }
}

/// How the linked session presents itself on the phone's device list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserDescription {
    pub device_name: String,
    pub browser: String,
    pub version: String,
}

impl BrowserDescription {
    pub fn new(
        device_name: impl Into<String>,
        browser: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            device_name: device_name.into(),
            browser: browser.into(),
            version: version.into(),
        }
    }

    /// Wire form: `[device, browser, release]`.
    pub fn to_wire(&self) -> [String; 3] {
        [
            self.device_name.clone(),
            self.browser.clone(),
            self.version.clone(),
        ]
    }
}

impl Default for BrowserDescription {
    fn default() -> Self {
        Self::new("Chrome (Linux)", "Chrome", "121")
    }
}

/// Session credentials.
///
/// Only `registered` is interpreted locally. Everything else belongs to the
/// bridge; fields it adds are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub registered: bool,

    #[serde(default)]
    pub registration_id: u16,

    #[serde(default)]
    pub adv_secret_key: String,

    /// Account identity once the phone has linked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credentials {
    /// Fresh, unregistered credentials for a new session.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut secret = [0u8; 32];
        rng.fill_bytes(&mut secret);

        Self {
            registered: false,
            // 14-bit registration id, never zero
            registration_id: rng.gen_range(1..16380),
            adv_secret_key: STANDARD.encode(secret),
            me: None,
            extra: Map::new(),
        }
    }
}

/// Key material updates, by category then key id. `None` deletes the key.
pub type KeyUpdates = BTreeMap<String, BTreeMap<String, Option<Value>>>;

/// A credential change emitted by a linking client.
#[derive(Debug, Clone)]
pub struct CredentialUpdate {
    pub creds: Credentials,
    pub keys: KeyUpdates,
}

/// Version lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionResponse {
    pub version: [u32; 3],
    #[serde(rename = "isLatest", default)]
    pub is_latest: bool,
}

/// Pairing code request body.
#[derive(Debug, Clone, Serialize)]
pub struct PairingCodeRequest<'a> {
    #[serde(rename = "phoneNumber")]
    pub phone_number: &'a str,
    pub version: [u32; 3],
    pub browser: [String; 3],
    pub creds: &'a Credentials,
}

/// Pairing code response.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingCodeResponse {
    pub code: String,
    #[serde(default)]
    pub creds: Option<Credentials>,
    #[serde(default)]
    pub keys: KeyUpdates,
}
