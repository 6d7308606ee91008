//! Handlers for the assistant itself: greeting, conversation, history.

use axum::extract::{Query, State};
use axum::Json;
use dealergpt_core::conversation::validate_message;
use dealergpt_db::models::conversation::ConversationRecord;
use dealergpt_pipeline::{ConversationRequest, ConversationResponse, Degraded};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::clamp_limit;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

/// Request body for `POST /dealergpt/conversation`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConversationBody {
    pub message: String,
    #[validate(length(min = 1, max = 128))]
    pub session_id: Option<String>,
    pub context: Option<serde_json::Value>,
}

/// An assistant answer plus, when it was produced without live data or
/// without the model, the reason.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    #[serde(flatten)]
    pub response: ConversationResponse,
    pub degraded: Option<&'static str>,
}

impl From<Result<ConversationResponse, Degraded>> for AssistantReply {
    fn from(outcome: Result<ConversationResponse, Degraded>) -> Self {
        match outcome {
            Ok(response) => Self {
                response,
                degraded: None,
            },
            Err(degraded) => Self {
                degraded: Some(degraded.reason.as_str()),
                response: degraded.into_response(),
            },
        }
    }
}

/// GET /api/dealergpt/greeting
pub async fn greeting(
    user: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<AssistantReply>> {
    let outcome = state.conversation.get_startup_greeting(user.user_id).await;
    Json(DataResponse {
        data: outcome.into(),
    })
}

/// POST /api/dealergpt/conversation
///
/// Always answers 200 once the input is valid; a degraded answer carries the
/// reason in `degraded`.
pub async fn converse(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ConversationBody>,
) -> AppResult<Json<DataResponse<AssistantReply>>> {
    validate_message(&body.message)?;
    body.validate()?;

    let outcome = state
        .conversation
        .process_conversation(ConversationRequest {
            user_id: user.user_id,
            message: body.message,
            session_id: body.session_id,
            context: body.context,
        })
        .await;

    let reply = AssistantReply::from(outcome);
    if let Some(reason) = reply.degraded {
        tracing::info!(user_id = user.user_id, reason, "Degraded conversation answer");
    }
    Ok(Json(DataResponse { data: reply }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub session_id: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/dealergpt/history?sessionId=&limit=
///
/// The caller's own exchanges, newest first.
pub async fn history(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<ConversationRecord>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
    let records = state
        .memory
        .history(user.user_id, params.session_id.as_deref(), limit)
        .await?;
    Ok(Json(DataResponse { data: records }))
}
