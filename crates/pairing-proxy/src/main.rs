//! Pairing Proxy - Entry point.

use link_client::{BridgeBackend, BrowserDescription};
use pairing_proxy::{
    api::{create_router, AppState, PairingSettings},
    config::{Config, LogConfig},
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);

    if log.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log);

    info!("Starting Pairing Proxy");

    let settings = match PairingSettings::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid pairing configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        default_region = ?config.pairing.default_region(),
        session_root = %settings.session_root.display(),
        timeout = ?settings.timeout,
        "Pairing settings loaded"
    );

    // Initialize linking bridge client
    let browser = BrowserDescription::new(
        &config.bridge.device_name,
        &config.bridge.browser,
        &config.bridge.browser_version,
    );
    let backend = match BridgeBackend::new(&config.bridge.api_url, browser, settings.timeout) {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to create bridge client: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_router(AppState::new(backend, settings));

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
