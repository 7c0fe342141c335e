//! Relay Gateway
//!
//! The policy decision point for autonomous agent actions:
//!
//! 1. Validates agent action manifests
//! 2. Evaluates policies via the external evaluator
//! 3. Issues cryptographic seals (Ed25519, time-bounded, one-time-use)
//! 4. Maintains the append-only audit ledger
//!
//! # Usage
//!
//! ```bash
//! # Start with environment configuration
//! RELAY_PRIVATE_KEY=... RELAY_JWT_SECRET=... relay-gateway
//!
//! # Override the bind address
//! relay-gateway --host 127.0.0.1 --port 9000
//! ```

mod config;

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relay_api::{create_router, ApiConfig, AppState};
use relay_auth::{JwtConfig, JwtService};
use relay_crypto::SealSigner;
use relay_db::Database;
use relay_policy::PolicyClient;

use crate::config::GatewayConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Relay Gateway - agent governance with cryptographic proofs
#[derive(Parser, Debug)]
#[command(name = "relay-gateway")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "RELAY_API_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RELAY_API_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RELAY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "RELAY_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, &args.log_format);

    let mut config = GatewayConfig::from_env();
    if let Some(host) = args.host {
        config.api_host = host;
    }
    if let Some(port) = args.port {
        config.api_port = port;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Relay Gateway"
    );

    // Fail fast on missing key material; serving without it would mean
    // either unsigned seals or unverifiable tokens
    let signer = init_signer(&config)?;
    let jwt = init_jwt(&config)?;

    let db = init_database(&config).await?;

    let policy = PolicyClient::new(
        config.opa_url.clone(),
        config.policy_path.clone(),
        config.policy_version.clone(),
    );

    tracing::info!(
        opa_url = %config.opa_url,
        policy_path = %config.policy_path,
        auth_required = config.auth_required,
        "Gateway configured"
    );

    let state = Arc::new(AppState {
        db,
        jwt,
        signer,
        policy,
        auth_required: config.auth_required,
        seal_ttl_minutes: config.seal_ttl_minutes,
    });

    let api_config = ApiConfig {
        cors_origins: config.cors_origins.clone(),
    };

    let app = create_router(state, api_config);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization
// =============================================================================

/// Initialize tracing/logging
fn init_logging(level: &str, format: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match format {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().with_target(true)).init();
        }
    }
}

/// Load the seal signing key; missing or malformed key material is fatal
fn init_signer(config: &GatewayConfig) -> anyhow::Result<SealSigner> {
    let Some(private_key) = &config.private_key else {
        anyhow::bail!(
            "Signing key not configured. Set RELAY_PRIVATE_KEY (generate one with relay-keygen)."
        );
    };

    let signer = SealSigner::from_base64(private_key)
        .map_err(|e| anyhow::anyhow!("Invalid RELAY_PRIVATE_KEY: {}", e))?;

    tracing::info!(public_key = %signer.public_key_base64(), "Seal signing key loaded");

    Ok(signer)
}

/// Build the JWT service; a missing secret is fatal
fn init_jwt(config: &GatewayConfig) -> anyhow::Result<JwtService> {
    let Some(secret) = &config.jwt_secret else {
        anyhow::bail!("JWT secret not configured. Set RELAY_JWT_SECRET.");
    };

    let jwt_config = JwtConfig {
        secret: secret.clone(),
        expiry_hours: config.jwt_expiry_hours,
        ..Default::default()
    };

    Ok(JwtService::new(jwt_config)?)
}

/// Connect to the store and apply migrations
async fn init_database(config: &GatewayConfig) -> anyhow::Result<Database> {
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    Ok(db)
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["relay-gateway", "--port", "9000"]);
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_missing_private_key_is_fatal() {
        let config = GatewayConfig::default();
        assert!(init_signer(&config).is_err());
    }

    #[test]
    fn test_missing_jwt_secret_is_fatal() {
        let config = GatewayConfig::default();
        assert!(init_jwt(&config).is_err());
    }

    #[test]
    fn test_valid_key_material_accepted() {
        let keypair = relay_crypto::SealKeypair::generate();
        let config = GatewayConfig {
            private_key: Some(keypair.private_key_base64()),
            jwt_secret: Some("test-secret".to_string()),
            ..Default::default()
        };

        assert!(init_signer(&config).is_ok());
        assert!(init_jwt(&config).is_ok());
    }
}
