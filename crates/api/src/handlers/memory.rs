//! Handlers for keyed assistant memory.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use dealergpt_core::dealership::Priority;
use dealergpt_core::error::CoreError;
use dealergpt_core::types::{DbId, Timestamp};
use dealergpt_db::models::memory::{MemoryEntry, PruneReport, SaveMemory};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::clamp_limit;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_MEMORY_LIMIT: i64 = 20;
const MAX_MEMORY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct MemoryParams {
    pub key: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/dealergpt/memory?key=&limit=
///
/// With `key`: that entry (404 when missing or expired). Without: the most
/// recently updated live entries.
pub async fn get(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MemoryParams>,
) -> AppResult<Response> {
    match params.key {
        Some(key) => {
            let entry = state
                .memory
                .get(&key)
                .await?
                .ok_or(AppError::Core(CoreError::KeyNotFound {
                    entity: "Memory entry",
                    key,
                }))?;
            Ok(Json(DataResponse { data: entry }).into_response())
        }
        None => {
            let limit = clamp_limit(params.limit, DEFAULT_MEMORY_LIMIT, MAX_MEMORY_LIMIT);
            let entries = state.memory.list_recent(limit).await?;
            Ok(Json(DataResponse { data: entries }).into_response())
        }
    }
}

/// Request body for `POST /dealergpt/memory`.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveMemoryBody {
    #[validate(length(min = 1, max = 255))]
    pub key: String,
    #[validate(length(min = 1, max = 64))]
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub tags: Vec<String>,
    pub priority: Option<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub relevance_score: Option<f64>,
    pub expires_at: Option<Timestamp>,
}

/// POST /api/dealergpt/memory
///
/// Saves by key; an existing entry with the same key is replaced.
pub async fn save(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<SaveMemoryBody>,
) -> AppResult<Json<DataResponse<MemoryEntry>>> {
    body.validate()?;
    if let Some(priority) = &body.priority {
        Priority::parse(priority)?;
    }

    let input = SaveMemory {
        key: body.key,
        entity_type: body.entity_type,
        entity_id: body.entity_id,
        data: body.data,
        tags: body.tags,
        priority: body.priority,
        relevance_score: body.relevance_score,
        expires_at: body.expires_at,
    };
    let entry = state.memory.save(&input, Some(user.user_id)).await?;
    Ok(Json(DataResponse { data: entry }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/dealergpt/memory/search?query=&limit=
///
/// Substring match over key, entity type and tags.
pub async fn search(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<MemoryEntry>>>> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("query must not be empty".into()))?;
    let limit = clamp_limit(params.limit, DEFAULT_MEMORY_LIMIT, MAX_MEMORY_LIMIT);
    let entries = state.memory.search(query, limit).await?;
    Ok(Json(DataResponse { data: entries }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PruneBody {
    #[validate(range(min = 1, max = 3650))]
    pub days: i64,
}

#[derive(Debug, Serialize)]
pub struct PruneResponse {
    #[serde(flatten)]
    pub report: PruneReport,
    pub total_deleted: u64,
}

/// POST /api/dealergpt/memory/prune (admin)
pub async fn prune(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<PruneBody>,
) -> AppResult<Json<DataResponse<PruneResponse>>> {
    body.validate()?;
    let report = state.memory.prune(body.days).await?;
    tracing::info!(user_id = admin.user_id, days = body.days, "Manual memory prune");
    Ok(Json(DataResponse {
        data: PruneResponse {
            total_deleted: report.total(),
            report,
        },
    }))
}
