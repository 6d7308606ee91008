//! Read-only views of the business data the assistant sees.

use axum::extract::{Query, State};
use axum::Json;
use dealergpt_core::dealership::VehicleStatus;
use dealergpt_core::error::CoreError;
use dealergpt_core::snapshot::BusinessSnapshot;
use dealergpt_db::models::vehicle::VehicleFilter;
use dealergpt_pipeline::InventorySlice;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/dealergpt/snapshot
///
/// Fails (rather than defaulting) when the data cannot be read.
pub async fn snapshot(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BusinessSnapshot>>> {
    let snapshot = state.conversation.aggregator().aggregate().await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// GET /api/dealergpt/inventory?status=&make=&min_price=&max_price=&from=&to=
pub async fn inventory(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<VehicleFilter>,
) -> AppResult<Json<DataResponse<InventorySlice>>> {
    validate_filter(&filter)?;
    let slice = state.conversation.aggregator().inventory_slice(&filter).await?;
    Ok(Json(DataResponse { data: slice }))
}

fn validate_filter(filter: &VehicleFilter) -> Result<(), CoreError> {
    if let Some(status) = &filter.status {
        VehicleStatus::parse(status)?;
    }
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(CoreError::Validation(
                "min_price must not exceed max_price".into(),
            ));
        }
    }
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(CoreError::Validation("from must not be after to".into()));
        }
    }
    Ok(())
}
