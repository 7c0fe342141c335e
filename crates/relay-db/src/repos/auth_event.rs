//! Auth event repository
//!
//! Append-only audit trail of authentication and authorization decisions.
//! Events are written synchronously before the response they describe.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuthEventRow, AuthEventType};
use crate::DbResult;

pub struct AuthEventRepo {
    pool: PgPool,
}

impl AuthEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn log(
        &self,
        event_type: AuthEventType,
        success: bool,
        agent_id: Option<&str>,
        org_id: Option<&str>,
        endpoint: Option<&str>,
        ip_address: Option<&str>,
        failure_reason: Option<&str>,
    ) -> DbResult<AuthEventRow> {
        let event = sqlx::query_as::<_, AuthEventRow>(
            r#"
            INSERT INTO auth_events (
                event_id, event_type, agent_id, org_id, endpoint,
                ip_address, success, failure_reason
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_type.as_str())
        .bind(agent_id)
        .bind(org_id)
        .bind(endpoint)
        .bind(ip_address)
        .bind(success)
        .bind(failure_reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<AuthEventRow>> {
        let events = sqlx::query_as::<_, AuthEventRow>(
            "SELECT * FROM auth_events ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }
}
