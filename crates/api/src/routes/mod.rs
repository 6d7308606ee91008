pub mod auth;
pub mod dealergpt;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/login                              login (public)
///
/// /dealergpt/greeting                      startup briefing
/// /dealergpt/conversation                  ask the assistant (POST)
/// /dealergpt/history                       caller's past exchanges
/// /dealergpt/insights                      active insights
/// /dealergpt/insights/generate             derive and store insights (admin, POST)
/// /dealergpt/insights/{id}/acknowledge     acknowledge (POST)
/// /dealergpt/memory                        get or list (GET), save (POST)
/// /dealergpt/memory/search                 substring search
/// /dealergpt/memory/prune                  retention prune (admin, POST)
/// /dealergpt/snapshot                      aggregated business snapshot
/// /dealergpt/inventory                     filtered inventory slice
/// /dealergpt/health                        per-data-source probe
/// /dealergpt/capabilities                  capability document
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/dealergpt", dealergpt::router())
}
