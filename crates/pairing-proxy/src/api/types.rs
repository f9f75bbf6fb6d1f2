//! API request and response types.

use crate::error::ProxyError;
use serde::Serialize;
use serde_json::Value;

/// Shown with every issued pairing code.
pub const PAIRING_HINT: &str =
    "Open WhatsApp → Linked Devices → Link a Device → 'Link with phone number' and enter this code.";

/// Largest integer an f64 holds exactly.
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

/// The `number` field of a pairing request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum NumberField {
    /// Absent, or a falsy value: `null`, `false`, `0`, `""`.
    #[default]
    Missing,
    /// Text to normalize.
    Present(String),
    /// Supplied, but can never be a phone number: `true`, objects, arrays,
    /// fractional numbers.
    Unusable,
}

/// Request to issue a pairing code.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PairRequest {
    /// Phone number as the caller wrote it
    pub number: NumberField,
}

impl PairRequest {
    /// Parse a complete request body. An empty body is an empty request.
    pub fn parse(body: &[u8]) -> Result<Self, ProxyError> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }

    fn from_value(value: &Value) -> Self {
        let number = match value.get("number") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => NumberField::Missing,
            Some(Value::String(s)) if s.is_empty() => NumberField::Missing,
            Some(Value::String(s)) => NumberField::Present(s.clone()),
            Some(Value::Number(n)) => integer_text(n),
            Some(Value::Bool(true)) | Some(Value::Array(_)) | Some(Value::Object(_)) => {
                NumberField::Unusable
            }
        };

        Self { number }
    }
}

/// Decimal text of an integral JSON number. Zero counts as missing.
fn integer_text(n: &serde_json::Number) -> NumberField {
    if let Some(i) = n.as_u64() {
        return if i == 0 {
            NumberField::Missing
        } else {
            NumberField::Present(i.to_string())
        };
    }

    if let Some(i) = n.as_i64() {
        return NumberField::Present(i.to_string());
    }

    // Exponent forms such as 9.4771234567e10 arrive as floats
    match n.as_f64() {
        Some(f) if f == 0.0 => NumberField::Missing,
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_F64 => {
            NumberField::Present((f as i64).to_string())
        }
        _ => NumberField::Unusable,
    }
}

/// Successful pairing response.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PairResponse {
    #[serde(rename_all = "camelCase")]
    Issued {
        ok: bool,
        code: String,
        session_id: String,
        hint: String,
    },
    AlreadyRegistered {
        ok: bool,
        message: String,
    },
}

impl PairResponse {
    pub fn issued(code: String, session_id: String) -> Self {
        PairResponse::Issued {
            ok: true,
            code,
            session_id,
            hint: PAIRING_HINT.to_string(),
        }
    }

    pub fn already_registered() -> Self {
        PairResponse::AlreadyRegistered {
            ok: true,
            message: "This account is already registered.".to_string(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub bridge_api_healthy: bool,
}
