//! Conversation orchestration.
//!
//! Per request: aggregate → build prompt → call model → persist → respond.
//! Failures never reach the caller as errors. A failed model call produces
//! the canned fallback answer; failed data reads let the model answer
//! without live figures. Both come back as [`Degraded`] so callers can tell
//! them apart from a genuine answer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Timelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use dealergpt_core::context::{
    detect_context, fallback_suggestions, suggestions_for, FALLBACK_MESSAGE,
};
use dealergpt_core::conversation::{DegradedReason, InsightBrief};
use dealergpt_core::greeting::render_greeting;
use dealergpt_core::insights::{derive_insights, INSIGHT_TTL_DAYS};
use dealergpt_core::prompt::{build_system_prompt, truncate_chars, PromptBudget};
use dealergpt_core::types::DbId;
use dealergpt_db::models::conversation::NewConversation;
use dealergpt_db::models::insight::Insight;
use dealergpt_llm::{ChatCompletion, ChatMessage};

use crate::aggregator::DataAggregator;
use crate::error::PipelineError;
use crate::memory::ConversationMemory;

/// Cap on the serialized client context forwarded to the model.
const MAX_CLIENT_CONTEXT_CHARS: usize = 2_000;

#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub budget: PromptBudget,
    pub llm_timeout: Duration,
    /// Active insights fed into the prompt and the greeting.
    pub insight_limit: usize,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            budget: PromptBudget::default(),
            llm_timeout: Duration::from_secs(60),
            insight_limit: 5,
        }
    }
}

/// One user message. The caller has already validated `message`.
#[derive(Debug, Clone)]
pub struct ConversationRequest {
    pub user_id: DbId,
    pub message: String,
    pub session_id: Option<String>,
    /// Free-form client state (current page, selected vehicle, ...).
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub message: String,
    pub context_used: Vec<String>,
    pub suggestions: Vec<String>,
    pub session_id: String,
    /// Milliseconds spent producing the answer.
    pub response_time: u64,
}

/// An answer produced without live data or without the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Degraded {
    pub reason: DegradedReason,
    pub response: ConversationResponse,
}

impl Degraded {
    pub fn into_response(self) -> ConversationResponse {
        self.response
    }
}

pub struct ConversationService {
    aggregator: DataAggregator,
    memory: Arc<dyn ConversationMemory>,
    llm: Arc<dyn ChatCompletion>,
    settings: ConversationSettings,
}

impl ConversationService {
    pub fn new(
        aggregator: DataAggregator,
        memory: Arc<dyn ConversationMemory>,
        llm: Arc<dyn ChatCompletion>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            aggregator,
            memory,
            llm,
            settings,
        }
    }

    pub fn aggregator(&self) -> &DataAggregator {
        &self.aggregator
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub fn model_configured(&self) -> bool {
        self.llm.is_configured()
    }

    /// Answer one message.
    ///
    /// `Err` carries a complete, displayable response; it is never empty.
    pub async fn process_conversation(
        &self,
        request: ConversationRequest,
    ) -> Result<ConversationResponse, Degraded> {
        let started = Instant::now();
        let session_id = request
            .session_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let context_used = detect_context(&request.message);

        let (aggregated, history, insights) = tokio::join!(
            self.aggregator.aggregate_or_default(),
            self.memory.recent_history(
                request.user_id,
                &session_id,
                self.settings.budget.max_history_turns
            ),
            self.memory
                .active_insights(request.user_id, self.settings.insight_limit),
        );
        let history = history.unwrap_or_else(|e| {
            tracing::warn!(
                user_id = request.user_id,
                error = %e,
                "Could not load conversation history"
            );
            Vec::new()
        });
        let insights = insights.unwrap_or_else(|e| {
            tracing::warn!(user_id = request.user_id, error = %e, "Could not load insights");
            Vec::new()
        });

        let prompt = build_system_prompt(
            &aggregated.snapshot,
            &history,
            &insights,
            &self.settings.budget,
        );
        tracing::debug!(
            user_id = request.user_id,
            session_id = %session_id,
            prompt_chars = prompt.text.len(),
            history_turns = prompt.history_turns_included,
            truncated = prompt.truncated,
            "System prompt built",
        );

        let mut messages = vec![ChatMessage::system(prompt.text)];
        if let Some(context) = render_client_context(request.context.as_ref()) {
            messages.push(ChatMessage::system(context));
        }
        messages.push(ChatMessage::user(request.message.clone()));

        let answer = match self.complete(&messages).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(
                    user_id = request.user_id,
                    session_id = %session_id,
                    error = %e,
                    "Model call failed, returning fallback answer",
                );
                return Err(Degraded {
                    reason: DegradedReason::ModelUnavailable,
                    response: fallback_response(session_id, started),
                });
            }
        };

        let response = ConversationResponse {
            message: answer,
            suggestions: suggestions_for(&context_used),
            context_used,
            session_id,
            response_time: elapsed_ms(started),
        };

        self.persist(request.user_id, &request.message, &response).await;

        tracing::info!(
            user_id = request.user_id,
            session_id = %response.session_id,
            response_time_ms = response.response_time,
            live_data = !aggregated.defaulted,
            "Conversation answered",
        );

        if aggregated.defaulted {
            Err(Degraded {
                reason: DegradedReason::DataUnavailable,
                response,
            })
        } else {
            Ok(response)
        }
    }

    /// The startup briefing. Built from the snapshot without calling the
    /// model; degraded when the snapshot had to be defaulted.
    pub async fn get_startup_greeting(
        &self,
        user_id: DbId,
    ) -> Result<ConversationResponse, Degraded> {
        let started = Instant::now();
        let (aggregated, insights) = tokio::join!(
            self.aggregator.aggregate_or_default(),
            self.memory.active_insights(user_id, self.settings.insight_limit),
        );
        let insights: Vec<InsightBrief> = insights.unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "Could not load insights for greeting");
            Vec::new()
        });

        let response = ConversationResponse {
            message: render_greeting(&aggregated.snapshot, &insights, Utc::now().hour()),
            context_used: Vec::new(),
            suggestions: suggestions_for(&[]),
            session_id: Uuid::new_v4().to_string(),
            response_time: elapsed_ms(started),
        };

        if aggregated.defaulted {
            Err(Degraded {
                reason: DegradedReason::DataUnavailable,
                response,
            })
        } else {
            Ok(response)
        }
    }

    /// Derive insights from a live snapshot and store those whose type has
    /// no live insight yet. Returns the stored rows.
    pub async fn generate_insights(&self) -> Result<Vec<Insight>, PipelineError> {
        let snapshot = self.aggregator.aggregate().await?;
        let existing = self.memory.active_insight_types().await?;
        let expires_at = Utc::now() + chrono::Duration::days(INSIGHT_TTL_DAYS);

        let mut seen = existing;
        let mut stored = Vec::new();
        for draft in derive_insights(&snapshot) {
            if seen.iter().any(|t| t == draft.insight_type) {
                continue;
            }
            stored.push(self.memory.store_insight(&draft, expires_at).await?);
            seen.push(draft.insight_type.to_string());
        }

        tracing::info!(stored = stored.len(), "Insights generated");
        Ok(stored)
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, PipelineError> {
        let timeout = self.settings.llm_timeout;
        tokio::time::timeout(timeout, self.llm.complete(messages))
            .await
            .map_err(|_| PipelineError::Timeout {
                operation: "model call",
                secs: timeout.as_secs(),
            })?
            .map_err(PipelineError::from)
    }

    /// Store the exchange; failures are logged and swallowed.
    async fn persist(&self, user_id: DbId, message: &str, response: &ConversationResponse) {
        let exchange = NewConversation {
            user_id,
            session_id: response.session_id.clone(),
            message: message.to_string(),
            response: response.message.clone(),
            context_used: response.context_used.clone(),
            response_time_ms: response.response_time as i64,
        };
        if let Err(e) = self.memory.record_exchange(exchange).await {
            tracing::warn!(user_id, error = %e, "Failed to persist conversation turn");
        }
    }
}

fn fallback_response(session_id: String, started: Instant) -> ConversationResponse {
    ConversationResponse {
        message: FALLBACK_MESSAGE.to_string(),
        context_used: Vec::new(),
        suggestions: fallback_suggestions(),
        session_id,
        response_time: elapsed_ms(started),
    }
}

/// Client context as a system note, or `None` when absent or empty.
fn render_client_context(context: Option<&serde_json::Value>) -> Option<String> {
    let value = context?;
    let empty = match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if empty {
        return None;
    }
    Some(format!(
        "Context from the user's screen: {}",
        truncate_chars(&value.to_string(), MAX_CLIENT_CONTEXT_CHARS)
    ))
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
