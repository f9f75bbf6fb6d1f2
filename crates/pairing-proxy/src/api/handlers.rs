//! HTTP request handlers.

use super::types::{HealthResponse, NumberField, PairRequest, PairResponse};
use super::AppState;
use crate::error::ProxyError;
use crate::session::{SessionDir, SessionId};
use axum::{body::Body, extract::State, Json};
use link_client::{AuthState, LinkError};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let bridge_healthy = state.backend.health_check().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        bridge_api_healthy: bridge_healthy,
    })
}

/// Issue a pairing code for the phone number in the request body.
pub async fn pair(
    State(state): State<AppState>,
    body: Body,
) -> Result<Json<PairResponse>, ProxyError> {
    let settings = &state.settings;

    let bytes = axum::body::to_bytes(body, settings.body_limit)
        .await
        .map_err(|e| ProxyError::MalformedBody(format!("Failed to read body: {}", e)))?;
    let request = PairRequest::parse(&bytes)?;

    let raw_number = match request.number {
        NumberField::Present(number) => number,
        NumberField::Missing => return Err(ProxyError::MissingNumber),
        NumberField::Unusable => return Err(ProxyError::InvalidPhoneNumber),
    };

    let normalized = settings.normalizer.normalize(&raw_number);
    if normalized.digits().len() < settings.min_digits {
        return Err(ProxyError::InvalidPhoneNumber);
    }
    let normalization = normalized.kind();
    let phone = normalized.into_digits();

    // Session directory is removed when `session` drops, on every early return
    let session = SessionDir::create(&settings.session_root, SessionId::generate())
        .await
        .map_err(|e| ProxyError::Session(format!("Failed to create session directory: {}", e)))?;
    let session_id = session.id().clone();
    info!(session_id = %session_id, phone_number = %phone, normalization, "Pairing request received");

    let auth = AuthState::open(session.path()).await?;
    let version = bounded(settings.timeout, "version lookup", state.backend.latest_version())
        .await?;
    let mut client = bounded(
        settings.timeout,
        "client connect",
        state.backend.connect(version, auth.creds.clone()),
    )
    .await?;
    client.on_credentials_update(auth.store());

    if client.is_registered() {
        info!(session_id = %session_id, "Session already registered");
        release(session, false).await;
        return Ok(Json(PairResponse::already_registered()));
    }

    let code = bounded(
        settings.timeout,
        "pairing code request",
        client.request_pairing_code(&phone),
    )
    .await
    .map_err(|e| match e {
        ProxyError::Link(detail) => ProxyError::PairingCode(detail),
        other => other,
    })?;

    info!(session_id = %session_id, "Pairing code generated");

    release(session, settings.keep_on_success).await;

    Ok(Json(PairResponse::issued(code, session_id.to_string())))
}

/// Any method other than POST on the pairing route.
pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

/// Retain or remove a finished session. Removal failures are only logged.
async fn release(session: SessionDir, keep: bool) {
    if keep {
        session.retain();
        return;
    }

    let session_id = session.id().clone();
    if let Err(e) = session.close().await {
        warn!(session_id = %session_id, error = %e, "Failed to remove session directory");
    }
}

/// Run a bridge call under a time limit.
async fn bounded<T>(
    limit: Duration,
    operation: &str,
    call: impl Future<Output = Result<T, LinkError>>,
) -> Result<T, ProxyError> {
    match timeout(limit, call).await {
        Ok(result) => result.map_err(ProxyError::from),
        Err(_) => {
            warn!(operation, ?limit, "Linking bridge call timed out");
            Err(ProxyError::Link(format!("{} timed out after {:?}", operation, limit)))
        }
    }
}
