//! HTTP API for the pairing proxy.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::logging_middleware;
pub use types::*;

use crate::config::Config;
use crate::phone::{PhoneNormalizer, UnknownRegion};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use link_client::LinkingBackend;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Settings for the pairing flow.
#[derive(Debug, Clone)]
pub struct PairingSettings {
    pub normalizer: PhoneNormalizer,
    pub min_digits: usize,
    pub timeout: Duration,
    pub session_root: PathBuf,
    pub keep_on_success: bool,
    pub body_limit: usize,
}

impl PairingSettings {
    pub fn from_config(config: &Config) -> Result<Self, UnknownRegion> {
        Ok(Self {
            normalizer: PhoneNormalizer::from_region(config.pairing.default_region())?,
            min_digits: config.pairing.min_digits,
            timeout: config.pairing.timeout,
            session_root: config.session.root.clone(),
            keep_on_success: config.session.keep_on_success,
            body_limit: config.server.body_limit,
        })
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Linking bridge
    pub backend: Arc<dyn LinkingBackend>,
    pub settings: Arc<PairingSettings>,
}

impl AppState {
    /// Create new application state.
    pub fn new(backend: impl LinkingBackend + 'static, settings: PairingSettings) -> Self {
        Self {
            backend: Arc::new(backend),
            settings: Arc::new(settings),
        }
    }
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/pair",
            post(handlers::pair).fallback(handlers::method_not_allowed),
        )
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
