//! Route definitions for the `/dealergpt` resource. Every route requires a
//! bearer token; prune and insight generation require `admin`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{business, conversation, insight, memory, status};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/greeting", get(conversation::greeting))
        .route("/conversation", post(conversation::converse))
        .route("/history", get(conversation::history))
        .route("/insights", get(insight::list))
        .route("/insights/generate", post(insight::generate))
        .route("/insights/{id}/acknowledge", post(insight::acknowledge))
        .route("/memory", get(memory::get).post(memory::save))
        .route("/memory/search", get(memory::search))
        .route("/memory/prune", post(memory::prune))
        .route("/snapshot", get(business::snapshot))
        .route("/inventory", get(business::inventory))
        .route("/health", get(status::health))
        .route("/capabilities", get(status::capabilities))
}
