//! Repository for the `dealergpt_conversations` table.

use dealergpt_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::conversation::{ConversationRecord, NewConversation};

const COLUMNS: &str = "id, user_id, session_id, message, response, context_used, \
                       response_time_ms, created_at, updated_at";

pub struct ConversationRepo;

impl ConversationRepo {
    /// Record one exchange.
    pub async fn create(
        pool: &PgPool,
        input: &NewConversation,
    ) -> Result<ConversationRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO dealergpt_conversations (user_id, session_id, message, response, \
                 context_used, response_time_ms)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConversationRecord>(&query)
            .bind(input.user_id)
            .bind(&input.session_id)
            .bind(&input.message)
            .bind(&input.response)
            .bind(&input.context_used)
            .bind(input.response_time_ms)
            .fetch_one(pool)
            .await
    }

    /// A user's most recent exchanges, newest first, optionally limited to
    /// one session.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: DbId,
        session_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ConversationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dealergpt_conversations \
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR session_id = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, ConversationRecord>(&query)
            .bind(user_id)
            .bind(session_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete every exchange created before `cutoff`. Returns rows removed.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dealergpt_conversations WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
