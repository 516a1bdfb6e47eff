//! API routes

pub mod competitions;
pub mod entrants;
pub mod health;
pub mod order_webhook;
pub mod pending_orders;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Commerce webhook (signature-verified, raw body)
    let webhook = Router::new().route("/api/orders/webhook", post(order_webhook::handle_webhook));

    // Review queue + directory administration
    let admin = Router::new()
        .route("/api/pending-orders", get(pending_orders::list))
        .route(
            "/api/pending-orders/{id}/resolve",
            post(pending_orders::resolve),
        )
        .route(
            "/api/pending-orders/{id}/cancel",
            post(pending_orders::cancel),
        )
        .route(
            "/api/competitions",
            get(competitions::list).post(competitions::create),
        )
        .route("/api/entrants", post(entrants::register))
        .route("/api/entrants/{id}", get(entrants::get_by_id));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(webhook)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
