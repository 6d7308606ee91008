//! Handlers for generated business insights.

use axum::extract::{Path, Query, State};
use axum::Json;
use dealergpt_core::error::CoreError;
use dealergpt_core::types::DbId;
use dealergpt_db::models::insight::Insight;
use dealergpt_pipeline::AcknowledgeOutcome;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{clamp_limit, LimitParams};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_INSIGHT_LIMIT: i64 = 10;
const MAX_INSIGHT_LIMIT: i64 = 50;

#[derive(Debug, Serialize)]
pub struct AcknowledgeResponse {
    pub id: DbId,
    pub acknowledged: bool,
    /// True when an earlier call had already acknowledged the insight.
    pub already_acknowledged: bool,
}

/// GET /api/dealergpt/insights?limit=
///
/// Active insights addressed to the caller (or to everyone), most urgent
/// first.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<Insight>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_INSIGHT_LIMIT, MAX_INSIGHT_LIMIT);
    let insights = state.memory.insights_for_user(user.user_id, limit).await?;
    Ok(Json(DataResponse { data: insights }))
}

/// POST /api/dealergpt/insights/{id}/acknowledge
pub async fn acknowledge(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AcknowledgeResponse>>> {
    let outcome = state.memory.acknowledge_insight(id, user.user_id).await?;
    let already_acknowledged = match outcome {
        AcknowledgeOutcome::Acknowledged => false,
        AcknowledgeOutcome::AlreadyAcknowledged => true,
        AcknowledgeOutcome::NotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Insight",
                id,
            }))
        }
    };
    Ok(Json(DataResponse {
        data: AcknowledgeResponse {
            id,
            acknowledged: true,
            already_acknowledged,
        },
    }))
}

/// POST /api/dealergpt/insights/generate (admin)
///
/// Derive insights from live data and store the new ones.
pub async fn generate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Insight>>>> {
    let stored = state.conversation.generate_insights().await?;
    tracing::info!(user_id = admin.user_id, stored = stored.len(), "Insight generation requested");
    Ok(Json(DataResponse { data: stored }))
}
