//! Memory/insight store: conversation log, keyed memory entries and
//! generated insights.
//!
//! [`ConversationMemory`] is the slice the conversation service needs.
//! [`PgMemoryStore`] implements it and adds the operations the HTTP layer
//! exposes directly.

use async_trait::async_trait;
use chrono::Utc;

use dealergpt_core::conversation::{HistoryTurn, InsightBrief};
use dealergpt_core::dealership::Priority;
use dealergpt_core::insights::InsightDraft;
use dealergpt_core::types::{DbId, Timestamp};
use dealergpt_db::models::conversation::{ConversationRecord, NewConversation};
use dealergpt_db::models::insight::{CreateInsight, Insight};
use dealergpt_db::models::memory::{MemoryEntry, PruneReport, SaveMemory};
use dealergpt_db::repositories::{ConversationRepo, InsightRepo, MemoryRepo};
use dealergpt_db::DbPool;

use crate::error::PipelineError;

/// Storage the conversation service reads context from and writes turns to.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Up to `limit` most recent turns of a session, oldest first.
    async fn recent_history(
        &self,
        user_id: DbId,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryTurn>, PipelineError>;

    async fn record_exchange(&self, exchange: NewConversation) -> Result<(), PipelineError>;

    /// Insights visible to `user_id`, most urgent first.
    async fn active_insights(
        &self,
        user_id: DbId,
        limit: usize,
    ) -> Result<Vec<InsightBrief>, PipelineError>;

    /// Types that already have a live, unacknowledged insight.
    async fn active_insight_types(&self) -> Result<Vec<String>, PipelineError>;

    async fn store_insight(
        &self,
        draft: &InsightDraft,
        expires_at: Timestamp,
    ) -> Result<Insight, PipelineError>;
}

/// Result of acknowledging an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcknowledgeOutcome {
    Acknowledged,
    /// Someone acknowledged it earlier; nothing changed.
    AlreadyAcknowledged,
    NotFound,
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgMemoryStore {
    pool: DbPool,
}

impl PgMemoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Upsert a memory entry by key.
    pub async fn save(
        &self,
        input: &SaveMemory,
        created_by: Option<DbId>,
    ) -> Result<MemoryEntry, PipelineError> {
        let entry = MemoryRepo::upsert(&self.pool, input, created_by).await?;
        tracing::debug!(key = %entry.key, memory_id = entry.id, "Memory entry saved");
        Ok(entry)
    }

    pub async fn get(&self, key: &str) -> Result<Option<MemoryEntry>, PipelineError> {
        Ok(MemoryRepo::find_by_key(&self.pool, key).await?)
    }

    pub async fn list_recent(&self, limit: i64) -> Result<Vec<MemoryEntry>, PipelineError> {
        Ok(MemoryRepo::list_recent(&self.pool, limit).await?)
    }

    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<MemoryEntry>, PipelineError> {
        Ok(MemoryRepo::search(&self.pool, query, limit).await?)
    }

    /// A user's stored exchanges, newest first.
    pub async fn history(
        &self,
        user_id: DbId,
        session_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ConversationRecord>, PipelineError> {
        Ok(ConversationRepo::list_recent(&self.pool, user_id, session_id, limit).await?)
    }

    pub async fn insights_for_user(
        &self,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Insight>, PipelineError> {
        Ok(InsightRepo::list_active_for_user(&self.pool, user_id, limit).await?)
    }

    /// Acknowledge an insight. Repeating the call is harmless.
    pub async fn acknowledge_insight(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<AcknowledgeOutcome, PipelineError> {
        if InsightRepo::acknowledge(&self.pool, id, user_id).await? {
            tracing::info!(insight_id = id, user_id, "Insight acknowledged");
            return Ok(AcknowledgeOutcome::Acknowledged);
        }
        match InsightRepo::find_by_id(&self.pool, id).await? {
            Some(_) => Ok(AcknowledgeOutcome::AlreadyAcknowledged),
            None => Ok(AcknowledgeOutcome::NotFound),
        }
    }

    /// Remove data older than `days`: low-priority and expired memory
    /// entries, acknowledged or expired insights, and every conversation turn.
    pub async fn prune(&self, days: i64) -> Result<PruneReport, PipelineError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        let report = PruneReport {
            memory_deleted: MemoryRepo::prune(&self.pool, cutoff).await?,
            insights_deleted: InsightRepo::prune(&self.pool, cutoff).await?,
            conversations_deleted: ConversationRepo::delete_older_than(&self.pool, cutoff).await?,
        };
        tracing::info!(
            days,
            memory_deleted = report.memory_deleted,
            insights_deleted = report.insights_deleted,
            conversations_deleted = report.conversations_deleted,
            "Memory store pruned",
        );
        Ok(report)
    }
}

#[async_trait]
impl ConversationMemory for PgMemoryStore {
    async fn recent_history(
        &self,
        user_id: DbId,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryTurn>, PipelineError> {
        let mut records =
            ConversationRepo::list_recent(&self.pool, user_id, Some(session_id), limit as i64)
                .await?;
        records.reverse();
        Ok(records.into_iter().map(HistoryTurn::from).collect())
    }

    async fn record_exchange(&self, exchange: NewConversation) -> Result<(), PipelineError> {
        ConversationRepo::create(&self.pool, &exchange).await?;
        Ok(())
    }

    async fn active_insights(
        &self,
        user_id: DbId,
        limit: usize,
    ) -> Result<Vec<InsightBrief>, PipelineError> {
        let rows = InsightRepo::list_active_for_user(&self.pool, user_id, limit as i64).await?;
        Ok(rows.iter().map(insight_brief).collect())
    }

    async fn active_insight_types(&self) -> Result<Vec<String>, PipelineError> {
        Ok(InsightRepo::active_types(&self.pool).await?)
    }

    async fn store_insight(
        &self,
        draft: &InsightDraft,
        expires_at: Timestamp,
    ) -> Result<Insight, PipelineError> {
        let input = CreateInsight {
            insight_type: draft.insight_type.to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            data: draft.data.clone(),
            priority: draft.priority.as_str().to_string(),
            target_users: Vec::new(),
            expires_at: Some(expires_at),
        };
        Ok(InsightRepo::create(&self.pool, &input).await?)
    }
}

/// The prompt-facing view of a stored insight.
pub fn insight_brief(insight: &Insight) -> InsightBrief {
    InsightBrief {
        id: insight.id,
        insight_type: insight.insight_type.clone(),
        title: insight.title.clone(),
        description: insight.description.clone(),
        priority: Priority::parse(&insight.priority).unwrap_or_default(),
    }
}
