//! Commerce order webhook handler
//!
//! POST /api/orders/webhook — raw body for signature verification, then
//! handed to the order engine. Already-processed and pending-review are
//! business outcomes, so all three statuses answer 200.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;

use crate::error::{AppError, AppResponse, AppResult, ok_with_message};
use crate::orders::{self, OrderOutcome, OrderPayload, signature};
use crate::state::AppState;

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<AppResponse<OrderOutcome>>> {
    if !state.order_webhook_secret.is_empty() {
        let sig_header = headers
            .get("x-order-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::validation("Missing X-Order-Signature header"))?;

        signature::verify_signature(&body, sig_header, &state.order_webhook_secret).map_err(
            |e| {
                tracing::warn!(error = e, "Webhook signature verification failed");
                AppError::validation(e)
            },
        )?;
    }

    let payload: OrderPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Malformed order payload: {e}")))?;

    tracing::info!(
        external_order_id = %payload.external_order_id,
        external_source = %payload.external_source,
        competition_id = %payload.competition_id,
        "Received order webhook"
    );

    let outcome = orders::process_order(&state.pool, &state.dispatcher, &payload).await?;
    let message = outcome.message.clone();
    Ok(ok_with_message(outcome, message))
}
