//! Pending order review queue handlers
//!
//! Resolution and cancellation are manual dispositions only; neither grants
//! credits.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use crate::db::pending_orders::{self, PendingOrder};
use crate::error::{AppResponse, AppResult, ok};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAction {
    pub resolved_by: String,
    pub notes: Option<String>,
}

/// GET /api/pending-orders — orders awaiting review, oldest first
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<AppResponse<Vec<PendingOrder>>>> {
    let orders = pending_orders::find_needing_review(&state.pool).await?;
    Ok(ok(orders))
}

/// POST /api/pending-orders/{id}/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<ReviewAction>,
) -> AppResult<Json<AppResponse<PendingOrder>>> {
    let order = pending_orders::resolve(
        &state.pool,
        &id,
        &action.resolved_by,
        action.notes.as_deref(),
    )
    .await?;
    tracing::info!(pending_order_id = %id, resolved_by = %action.resolved_by, "Pending order resolved");
    Ok(ok(order))
}

/// POST /api/pending-orders/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<ReviewAction>,
) -> AppResult<Json<AppResponse<PendingOrder>>> {
    let order = pending_orders::cancel(
        &state.pool,
        &id,
        &action.resolved_by,
        action.notes.as_deref(),
    )
    .await?;
    tracing::info!(pending_order_id = %id, resolved_by = %action.resolved_by, "Pending order cancelled");
    Ok(ok(order))
}
