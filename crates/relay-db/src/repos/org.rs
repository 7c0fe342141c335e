//! Organization repository

use sqlx::PgPool;

use crate::models::{AgentRow, OrgRow};
use crate::DbResult;

pub struct OrgRepo {
    pool: PgPool,
}

impl OrgRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an organization together with its initial admin agent.
    ///
    /// Both rows land in one transaction: an organization without its
    /// bootstrap agent would be unreachable, so neither exists without the
    /// other.
    pub async fn create_with_admin(
        &self,
        org_id: &str,
        org_name: &str,
        contact_email: &str,
        admin_agent_id: &str,
    ) -> DbResult<(OrgRow, AgentRow)> {
        let mut tx = self.pool.begin().await?;

        let org = sqlx::query_as::<_, OrgRow>(
            r#"
            INSERT INTO organizations (org_id, org_name, contact_email)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(org_name)
        .bind(contact_email)
        .fetch_one(&mut *tx)
        .await?;

        let agent = sqlx::query_as::<_, AgentRow>(
            r#"
            INSERT INTO agents (agent_id, org_id, agent_name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(admin_agent_id)
        .bind(org_id)
        .bind("admin-agent")
        .bind("Initial admin agent created during organization registration")
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((org, agent))
    }

    pub async fn find_by_org_id(&self, org_id: &str) -> DbResult<Option<OrgRow>> {
        let org = sqlx::query_as::<_, OrgRow>("SELECT * FROM organizations WHERE org_id = $1")
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(org)
    }

    pub async fn count_agents(&self, org_id: &str) -> DbResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM agents WHERE org_id = $1")
                .bind(org_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
