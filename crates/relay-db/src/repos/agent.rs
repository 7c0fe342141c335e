//! Agent repository

use sqlx::PgPool;

use crate::models::AgentRow;
use crate::DbResult;

pub struct AgentRepo {
    pool: PgPool,
}

impl AgentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        agent_id: &str,
        org_id: &str,
        agent_name: &str,
        description: Option<&str>,
    ) -> DbResult<AgentRow> {
        let agent = sqlx::query_as::<_, AgentRow>(
            r#"
            INSERT INTO agents (agent_id, org_id, agent_name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(org_id)
        .bind(agent_name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(agent)
    }

    pub async fn find_by_agent_id(&self, agent_id: &str) -> DbResult<Option<AgentRow>> {
        let agent = sqlx::query_as::<_, AgentRow>("SELECT * FROM agents WHERE agent_id = $1")
            .bind(agent_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(agent)
    }

    pub async fn exists(&self, agent_id: &str) -> DbResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM agents WHERE agent_id = $1)")
                .bind(agent_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn list_by_org(&self, org_id: &str) -> DbResult<Vec<AgentRow>> {
        let agents = sqlx::query_as::<_, AgentRow>(
            "SELECT * FROM agents WHERE org_id = $1 ORDER BY created_at DESC",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(agents)
    }
}
