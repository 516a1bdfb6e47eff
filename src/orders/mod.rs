//! Order Processing Engine
//!
//! Converts a commerce-system purchase notification into entry credits,
//! durably and idempotently. Each call runs the decision sequence on one
//! SQLite transaction:
//!
//! 1. entrant find-or-create (the upsert is the first statement so the
//!    write lock serializes concurrent deliveries)
//! 2. idempotency lookup on the (externalOrderId, externalSource) key
//! 3. exclusivity check against the competition directory
//! 4. credit grant, or pending-order routing on conflict
//!
//! Domain events are published only after the transaction commits.

pub mod exclusivity;
pub mod signature;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use crate::db::{
    competitions, entrants, entry_credits,
    entry_credits::CreateEntryCredit,
    new_id, now_millis, pending_orders,
    pending_orders::CreatePendingOrder,
};
use crate::error::AppError;
use crate::events::{
    DomainEvent, EntryCreditAddedEvent, EventDispatcher, OrderPendingReviewEvent,
};

pub const REASON_COMPETITION_EXCLUSIVITY: &str = "COMPETITION_EXCLUSIVITY";

/// Inbound purchase notification
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    #[validate(length(min = 1, message = "externalOrderId must not be empty"))]
    pub external_order_id: String,
    #[validate(length(min = 1, message = "externalSource must not be empty"))]
    pub external_source: String,
    #[validate(length(min = 1, message = "competitionId must not be empty"))]
    pub competition_id: String,
    #[validate(email(message = "entrantEmail must be a valid address"))]
    pub entrant_email: String,
    pub entrant_name: Option<String>,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Processed,
    AlreadyProcessed,
    PendingReview,
}

/// Business outcome of one delivery. All three statuses are HTTP 200;
/// already-processed and pending-review are outcomes, not transport errors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOutcome {
    pub entrant_id: Option<String>,
    pub credits_added: i64,
    pub status: OrderStatus,
    pub message: String,
}

/// Process one purchase notification.
///
/// Idempotent: replaying the same (externalOrderId, externalSource) any
/// number of times leaves exactly one credit or pending order and fires
/// exactly one event. A failed attempt leaves no partial state; the
/// upstream transport is expected to redeliver.
pub async fn process_order(
    pool: &SqlitePool,
    dispatcher: &EventDispatcher,
    payload: &OrderPayload,
) -> Result<OrderOutcome, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut tx = pool.begin().await?;

    // Write first: the upsert takes the SQLite write lock, so concurrent
    // deliveries for the same order key or entrant serialize here instead
    // of racing past the checks below. Duplicate paths roll the upsert back.
    let entrant = entrants::upsert_by_email(
        &mut tx,
        &payload.entrant_email,
        payload.entrant_name.as_deref(),
    )
    .await?;

    if let Some(credit) = entry_credits::find_by_external_order(
        &mut tx,
        &payload.external_order_id,
        &payload.external_source,
    )
    .await?
    {
        tx.rollback().await?;
        tracing::info!(
            external_order_id = %payload.external_order_id,
            external_source = %payload.external_source,
            credit_id = %credit.id,
            "Duplicate delivery, order already granted"
        );
        return Ok(already_processed(
            Some(credit.entrant_id),
            format!(
                "Order {} from {} was already processed",
                payload.external_order_id, payload.external_source
            ),
        ));
    }

    if let Some(pending) = pending_orders::find_by_external_order(
        &mut tx,
        &payload.external_order_id,
        &payload.external_source,
    )
    .await?
    {
        tx.rollback().await?;
        let message = if pending.status == pending_orders::STATUS_NEEDS_REVIEW {
            format!(
                "Order {} from {} is awaiting review (pending order {})",
                payload.external_order_id, payload.external_source, pending.id
            )
        } else {
            // A closed review is a terminal disposition of the order key
            format!(
                "Order {} from {} was closed by review ({})",
                payload.external_order_id, payload.external_source, pending.status
            )
        };
        tracing::info!(
            external_order_id = %payload.external_order_id,
            pending_order_id = %pending.id,
            status = %pending.status,
            "Duplicate delivery of a reviewed order"
        );
        return Ok(already_processed(pending.entrant_id, message));
    }

    let competition = competitions::find_by_id(&mut tx, &payload.competition_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Competition {}", payload.competition_id)))?;

    match exclusivity::check(&mut tx, &entrant.id, &competition).await? {
        exclusivity::Decision::Conflict { held_type } => {
            let pending_id = new_id();
            let now = now_millis();
            match pending_orders::create(
                &mut tx,
                &CreatePendingOrder {
                    id: &pending_id,
                    external_order_id: &payload.external_order_id,
                    external_source: &payload.external_source,
                    competition_id: &competition.id,
                    entrant_id: Some(&entrant.id),
                    reason: REASON_COMPETITION_EXCLUSIVITY,
                    now,
                },
            )
            .await
            {
                Ok(()) => {}
                Err(e) if is_unique_violation(&e) => {
                    // A concurrent duplicate delivery already opened the review
                    tx.rollback().await?;
                    return Ok(already_processed(
                        Some(entrant.id),
                        format!(
                            "Order {} from {} is awaiting review",
                            payload.external_order_id, payload.external_source
                        ),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
            tx.commit().await?;

            tracing::info!(
                external_order_id = %payload.external_order_id,
                entrant_id = %entrant.id,
                competition_id = %competition.id,
                held_type = %held_type,
                requested_type = %competition.competition_type,
                "Order routed to review: competition exclusivity"
            );

            dispatcher.publish(DomainEvent::OrderPendingReview(OrderPendingReviewEvent {
                pending_order_id: pending_id,
                external_order_id: payload.external_order_id.clone(),
                external_source: payload.external_source.clone(),
                competition_id: competition.id.clone(),
                entrant_email: payload.entrant_email.clone(),
                quantity: payload.quantity,
                reason: REASON_COMPETITION_EXCLUSIVITY.to_string(),
            }));

            Ok(OrderOutcome {
                entrant_id: Some(entrant.id),
                credits_added: 0,
                status: OrderStatus::PendingReview,
                message: format!(
                    "Order requires review: entrant already holds {held_type} entries for this event"
                ),
            })
        }
        exclusivity::Decision::Ok => {
            let credit_id = new_id();
            let now = now_millis();
            match entry_credits::create(
                &mut tx,
                &CreateEntryCredit {
                    id: &credit_id,
                    entrant_id: &entrant.id,
                    competition_id: &competition.id,
                    external_order_id: &payload.external_order_id,
                    external_source: &payload.external_source,
                    quantity: payload.quantity,
                    purchased_at: payload.purchased_at.timestamp_millis(),
                    now,
                },
            )
            .await
            {
                Ok(()) => {}
                Err(e) if is_unique_violation(&e) => {
                    // A concurrent duplicate delivery won the insert
                    tx.rollback().await?;
                    return Ok(already_processed(
                        Some(entrant.id),
                        format!(
                            "Order {} from {} was already processed",
                            payload.external_order_id, payload.external_source
                        ),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
            tx.commit().await?;

            tracing::info!(
                external_order_id = %payload.external_order_id,
                entrant_id = %entrant.id,
                credit_id = %credit_id,
                competition_id = %competition.id,
                quantity = payload.quantity,
                "Entry credits granted"
            );

            dispatcher.publish(DomainEvent::EntryCreditAdded(EntryCreditAddedEvent {
                entrant_id: entrant.id.clone(),
                credit_id,
                competition_id: competition.id.clone(),
                quantity: payload.quantity,
                entrant_email: payload.entrant_email.clone(),
                entrant_name: entrant.name.clone(),
            }));

            Ok(OrderOutcome {
                entrant_id: Some(entrant.id),
                credits_added: payload.quantity,
                status: OrderStatus::Processed,
                message: format!("Granted {} entry credits", payload.quantity),
            })
        }
    }
}

fn already_processed(entrant_id: Option<String>, message: String) -> OrderOutcome {
    OrderOutcome {
        entrant_id,
        credits_added: 0,
        status: OrderStatus::AlreadyProcessed,
        message,
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> OrderPayload {
        OrderPayload {
            external_order_id: "ord-100".into(),
            external_source: "shopfront".into(),
            competition_id: "comp-1".into(),
            entrant_email: "a@x.com".into(),
            entrant_name: Some("Alex".into()),
            quantity: 3,
            purchased_at: Utc::now(),
        }
    }

    #[test]
    fn valid_payload_passes_validation() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn empty_order_id_is_rejected() {
        let mut p = payload();
        p.external_order_id.clear();
        assert!(p.validate().is_err());
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut p = payload();
        p.external_source.clear();
        assert!(p.validate().is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut p = payload();
        p.quantity = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut p = payload();
        p.entrant_email = "not-an-email".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn payload_deserializes_from_wire_format() {
        let json = r#"{
            "externalOrderId": "ord-1",
            "externalSource": "shopfront",
            "competitionId": "comp-1",
            "entrantEmail": "a@x.com",
            "quantity": 2,
            "purchasedAt": "2026-08-01T10:00:00Z"
        }"#;
        let p: OrderPayload = serde_json::from_str(json).unwrap();
        assert_eq!(p.external_order_id, "ord-1");
        assert_eq!(p.quantity, 2);
        assert!(p.entrant_name.is_none());
    }
}
