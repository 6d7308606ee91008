//! Repository for the `dealergpt_memory` table.

use dealergpt_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::memory::{MemoryEntry, SaveMemory};

const COLUMNS: &str = "id, key, entity_type, entity_id, data, tags, priority, relevance_score, \
                       expires_at, created_by, created_at, updated_at";

/// Filter shared by reads: hide entries past their expiry.
const NOT_EXPIRED: &str = "(expires_at IS NULL OR expires_at > NOW())";

pub struct MemoryRepo;

impl MemoryRepo {
    /// Insert or overwrite the entry for `input.key`.
    ///
    /// On conflict every field is replaced except `created_by` and
    /// `created_at`, which keep the original writer.
    pub async fn upsert(
        pool: &PgPool,
        input: &SaveMemory,
        created_by: Option<DbId>,
    ) -> Result<MemoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO dealergpt_memory (key, entity_type, entity_id, data, tags, priority, \
                 relevance_score, expires_at, created_by)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'medium'), COALESCE($7, 0), $8, $9)
             ON CONFLICT (key) DO UPDATE SET
                 entity_type = EXCLUDED.entity_type,
                 entity_id = EXCLUDED.entity_id,
                 data = EXCLUDED.data,
                 tags = EXCLUDED.tags,
                 priority = EXCLUDED.priority,
                 relevance_score = EXCLUDED.relevance_score,
                 expires_at = EXCLUDED.expires_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MemoryEntry>(&query)
            .bind(&input.key)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.data)
            .bind(&input.tags)
            .bind(&input.priority)
            .bind(input.relevance_score)
            .bind(input.expires_at)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a live entry by key.
    pub async fn find_by_key(
        pool: &PgPool,
        key: &str,
    ) -> Result<Option<MemoryEntry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM dealergpt_memory WHERE key = $1 AND {NOT_EXPIRED}");
        sqlx::query_as::<_, MemoryEntry>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Most recently updated live entries.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<MemoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dealergpt_memory WHERE {NOT_EXPIRED} \
             ORDER BY updated_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, MemoryEntry>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring search over key, entity type and tags,
    /// most relevant first.
    pub async fn search(
        pool: &PgPool,
        term: &str,
        limit: i64,
    ) -> Result<Vec<MemoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dealergpt_memory \
             WHERE {NOT_EXPIRED} \
               AND (key ILIKE $1 OR entity_type ILIKE $1 \
                    OR EXISTS (SELECT 1 FROM unnest(tags) AS t(tag) WHERE t.tag ILIKE $1)) \
             ORDER BY relevance_score DESC, updated_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, MemoryEntry>(&query)
            .bind(format!("%{}%", escape_like(term)))
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete low-priority entries created before `cutoff` and every entry
    /// that has expired. Returns rows removed.
    pub async fn prune(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM dealergpt_memory \
             WHERE (priority = 'low' AND created_at < $1) \
                OR (expires_at IS NOT NULL AND expires_at <= NOW())",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("bmw"), "bmw");
    }
}
