//! Relay Database Layer
//!
//! PostgreSQL persistence for the gateway. Two concerns live here:
//!
//! - **Tenancy registry**: organizations and their agents
//! - **Audit ledger**: manifests, seals, and auth events, append-only
//!
//! # Repository Pattern
//!
//! Each domain has its own repository with the queries it needs. The ledger
//! tables accept inserts and exactly one conditional update (the seal
//! executed-bit); nothing else mutates them.

pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod repos;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use models::*;
pub use repos::*;

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    /// PostgreSQL connection pool
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url())
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        Ok(Self { pg })
    }

    /// Create a pool without establishing connections.
    ///
    /// Connections are opened on first use; handler tests that never touch
    /// the store rely on this.
    pub fn connect_lazy(config: &DatabaseConfig) -> DbResult<Self> {
        let pg = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(&config.database_url())
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;
        Ok(Self { pg })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pg).await.is_ok()
    }

    /// Create repository instances
    pub fn org_repo(&self) -> OrgRepo {
        OrgRepo::new(self.pg.clone())
    }

    pub fn agent_repo(&self) -> AgentRepo {
        AgentRepo::new(self.pg.clone())
    }

    pub fn ledger_repo(&self) -> LedgerRepo {
        LedgerRepo::new(self.pg.clone())
    }

    pub fn auth_event_repo(&self) -> AuthEventRepo {
        AuthEventRepo::new(self.pg.clone())
    }
}
