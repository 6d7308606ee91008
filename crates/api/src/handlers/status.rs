//! Assistant health and capability documents.

use axum::extract::State;
use axum::Json;
use dealergpt_core::capabilities::{capabilities as capability_document, Capabilities};
use dealergpt_pipeline::{probe_data_sources, DataSourceHealth};
use serde::Serialize;

use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub name: String,
    pub configured: bool,
}

#[derive(Debug, Serialize)]
pub struct AssistantHealth {
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: &'static str,
    pub version: &'static str,
    pub model: ModelStatus,
    pub data_sources: Vec<DataSourceHealth>,
}

/// GET /api/dealergpt/health
///
/// Probes every data source. An unconfigured model downgrades an otherwise
/// healthy report to `degraded`.
pub async fn health(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<AssistantHealth>> {
    let report = probe_data_sources(
        state.data_source.as_ref(),
        state.config.dealergpt.data_timeout(),
    )
    .await;
    let configured = state.conversation.model_configured();
    let status = match report.status {
        "healthy" if !configured => "degraded",
        other => other,
    };

    Json(DataResponse {
        data: AssistantHealth {
            status,
            version: env!("CARGO_PKG_VERSION"),
            model: ModelStatus {
                name: state.conversation.model().to_string(),
                configured,
            },
            data_sources: report.sources,
        },
    })
}

/// GET /api/dealergpt/capabilities
pub async fn capabilities(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<Capabilities>> {
    Json(DataResponse {
        data: capability_document(
            env!("CARGO_PKG_VERSION"),
            state.conversation.model(),
            state.conversation.model_configured(),
            state.conversation.settings().budget.max_history_turns,
        ),
    })
}
