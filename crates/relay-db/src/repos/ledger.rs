//! Audit ledger repository
//!
//! Append-only writes for manifests and seals, the single conditional update
//! for seal execution, and the compliance read queries. Immutability of
//! everything else is a protocol property: no other statement in this module
//! (or anywhere in the gateway) updates or deletes ledger rows.

use relay_types::{Manifest, Seal};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuditFilter, AuditRow, LedgerStats, ManifestRow, MarkExecuted, SealRow};
use crate::DbResult;

pub struct LedgerRepo {
    pool: PgPool,
}

impl LedgerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write a decided manifest and its seal in one transaction.
    ///
    /// The manifest row is inserted first so the seal's foreign key holds;
    /// any failure rolls back both. A seal must never exist without its
    /// manifest.
    pub async fn write_decision(&self, manifest: &Manifest, seal: &Seal) -> DbResult<()> {
        let manifest_json = serde_json::to_value(manifest)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO manifests (
                manifest_id, created_at, agent_id, org_id, user_id,
                provider, method, parameters, reasoning, confidence_score,
                environment, manifest_json
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(manifest.manifest_id)
        .bind(manifest.timestamp)
        .bind(&manifest.agent.agent_id)
        .bind(&manifest.agent.org_id)
        .bind(&manifest.agent.user_id)
        .bind(&manifest.action.provider)
        .bind(&manifest.action.method)
        .bind(&manifest.action.parameters)
        .bind(&manifest.justification.reasoning)
        .bind(manifest.justification.confidence_score)
        .bind(&manifest.environment)
        .bind(&manifest_json)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO seals (
                seal_id, manifest_id, approved, policy_version, denial_reason,
                signature, public_key, issued_at, expires_at, executed, executed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&seal.seal_id)
        .bind(seal.manifest_id)
        .bind(seal.approved)
        .bind(&seal.policy_version)
        .bind(&seal.denial_reason)
        .bind(&seal.signature)
        .bind(&seal.public_key)
        .bind(seal.issued_at)
        .bind(seal.expires_at)
        .bind(seal.executed)
        .bind(seal.executed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    pub async fn find_manifest(&self, manifest_id: Uuid) -> DbResult<Option<ManifestRow>> {
        let manifest =
            sqlx::query_as::<_, ManifestRow>("SELECT * FROM manifests WHERE manifest_id = $1")
                .bind(manifest_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(manifest)
    }

    pub async fn find_seal(&self, seal_id: &str) -> DbResult<Option<SealRow>> {
        let seal = sqlx::query_as::<_, SealRow>("SELECT * FROM seals WHERE seal_id = $1")
            .bind(seal_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(seal)
    }

    /// Flip a seal's executed bit, exactly once, within its TTL.
    ///
    /// The conditional UPDATE is the whole concurrency story: under N racing
    /// callers the row predicate admits one winner and the rest observe zero
    /// affected rows.
    pub async fn mark_executed(&self, seal_id: &str) -> DbResult<MarkExecuted> {
        let result = sqlx::query(
            r#"
            UPDATE seals
            SET executed = TRUE, executed_at = NOW()
            WHERE seal_id = $1 AND executed = FALSE AND expires_at > NOW()
            "#,
        )
        .bind(seal_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(MarkExecuted::Updated);
        }

        // Zero rows: spent, stale, or never existed
        match self.find_seal(seal_id).await? {
            Some(seal) if seal.executed => Ok(MarkExecuted::AlreadyExecuted),
            Some(_) => Ok(MarkExecuted::Expired),
            None => Ok(MarkExecuted::NotFound),
        }
    }

    /// Query manifests joined with their seals, newest first.
    ///
    /// `approved_only` is tri-state: `Some(true)` approved, `Some(false)`
    /// denied, `None` both. The limit is clamped to [1, 1000].
    pub async fn query_manifests(
        &self,
        filter: &AuditFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<AuditRow>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT m.manifest_id, m.created_at, m.agent_id, m.org_id,
                   m.provider, m.method, m.parameters, m.reasoning, m.environment,
                   s.seal_id, s.approved, s.policy_version, s.denial_reason, s.executed
            FROM manifests m
            LEFT JOIN seals s ON s.manifest_id = m.manifest_id
            WHERE ($1::text IS NULL OR m.org_id = $1)
              AND ($2::text IS NULL OR m.agent_id = $2)
              AND ($3::text IS NULL OR m.provider = $3)
              AND ($4::boolean IS NULL OR s.approved = $4)
            ORDER BY m.created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(&filter.org_id)
        .bind(&filter.agent_id)
        .bind(&filter.provider)
        .bind(filter.approved_only)
        .bind(limit.clamp(1, 1000))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Aggregate counters over the same filter scope as `query_manifests`
    pub async fn stats(&self, filter: &AuditFilter) -> DbResult<LedgerStats> {
        let (total, approved, denied, executed): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE s.approved),
                   COUNT(*) FILTER (WHERE s.approved = FALSE),
                   COUNT(*) FILTER (WHERE s.executed)
            FROM manifests m
            LEFT JOIN seals s ON s.manifest_id = m.manifest_id
            WHERE ($1::text IS NULL OR m.org_id = $1)
              AND ($2::text IS NULL OR m.agent_id = $2)
            "#,
        )
        .bind(&filter.org_id)
        .bind(&filter.agent_id)
        .fetch_one(&self.pool)
        .await?;

        let approval_rate = if total > 0 {
            (approved as f64 / total as f64 * 10000.0).round() / 100.0
        } else {
            0.0
        };

        Ok(LedgerStats {
            total_manifests: total,
            approved,
            denied,
            executed,
            approval_rate,
        })
    }
}
