//! Repository for the `dealergpt_insights` table.

use dealergpt_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::insight::{CreateInsight, Insight};

const COLUMNS: &str = "id, insight_type, title, description, data, priority, target_users, \
                       is_active, is_acknowledged, acknowledged_by, acknowledged_at, \
                       expires_at, created_at, updated_at";

/// Visible to a user: active, unacknowledged, unexpired, and either
/// broadcast or targeted at `$1`.
const VISIBLE_TO_USER: &str = "is_active AND NOT is_acknowledged \
     AND (expires_at IS NULL OR expires_at > NOW()) \
     AND (cardinality(target_users) = 0 OR $1 = ANY(target_users))";

/// Sort key putting `urgent` first.
const PRIORITY_RANK: &str = "CASE priority WHEN 'urgent' THEN 4 WHEN 'high' THEN 3 \
     WHEN 'medium' THEN 2 ELSE 1 END";

pub struct InsightRepo;

impl InsightRepo {
    pub async fn create(pool: &PgPool, input: &CreateInsight) -> Result<Insight, sqlx::Error> {
        let query = format!(
            "INSERT INTO dealergpt_insights (insight_type, title, description, data, priority, \
                 target_users, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Insight>(&query)
            .bind(&input.insight_type)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.data)
            .bind(&input.priority)
            .bind(&input.target_users)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Insight>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dealergpt_insights WHERE id = $1");
        sqlx::query_as::<_, Insight>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insights the user should see, most urgent then newest first.
    pub async fn list_active_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Insight>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dealergpt_insights \
             WHERE {VISIBLE_TO_USER} \
             ORDER BY {PRIORITY_RANK} DESC, created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Insight>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Distinct types that currently have a live, unacknowledged insight.
    pub async fn active_types(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT insight_type FROM dealergpt_insights \
             WHERE is_active AND NOT is_acknowledged \
               AND (expires_at IS NULL OR expires_at > NOW()) \
             ORDER BY insight_type",
        )
        .fetch_all(pool)
        .await
    }

    /// Mark an insight acknowledged. Returns `true` if this call changed it;
    /// acknowledging twice is a no-op.
    pub async fn acknowledge(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE dealergpt_insights \
             SET is_acknowledged = true, acknowledged_by = $2, acknowledged_at = NOW() \
             WHERE id = $1 AND NOT is_acknowledged",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete acknowledged or expired insights created before `cutoff`.
    pub async fn prune(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM dealergpt_insights \
             WHERE created_at < $1 \
               AND (is_acknowledged OR (expires_at IS NOT NULL AND expires_at <= NOW()))",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
