//! Pending order queue: triage ordering and terminal transitions.

mod common;

use common::setup;
use rosette_cloud::AppError;
use rosette_cloud::db::pending_orders::{
    self, CreatePendingOrder, STATUS_CANCELLED, STATUS_NEEDS_REVIEW, STATUS_RESOLVED,
};
use sqlx::SqlitePool;

async fn seed_pending(pool: &SqlitePool, id: &str, order_id: &str, created_at: i64) {
    let mut conn = pool.acquire().await.unwrap();
    pending_orders::create(
        &mut conn,
        &CreatePendingOrder {
            id,
            external_order_id: order_id,
            external_source: "shopfront",
            competition_id: "comp-1",
            entrant_id: None,
            reason: "COMPETITION_EXCLUSIVITY",
            now: created_at,
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn review_queue_lists_oldest_first() {
    let app = setup().await;
    seed_pending(&app.pool, "p-2", "ord-2", 2_000).await;
    seed_pending(&app.pool, "p-1", "ord-1", 1_000).await;
    seed_pending(&app.pool, "p-3", "ord-3", 3_000).await;

    let review = pending_orders::find_needing_review(&app.pool).await.unwrap();
    let ids: Vec<&str> = review.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["p-1", "p-2", "p-3"]);
    assert!(review.iter().all(|o| o.status == STATUS_NEEDS_REVIEW));
}

#[tokio::test]
async fn resolve_stamps_the_disposition() {
    let app = setup().await;
    seed_pending(&app.pool, "p-1", "ord-1", 1_000).await;

    let resolved = pending_orders::resolve(&app.pool, "p-1", "admin", Some("granted manually"))
        .await
        .unwrap();

    assert_eq!(resolved.status, STATUS_RESOLVED);
    assert_eq!(resolved.resolved_by.as_deref(), Some("admin"));
    assert_eq!(resolved.resolution_notes.as_deref(), Some("granted manually"));
    assert!(resolved.resolved_at.is_some());
}

#[tokio::test]
async fn resolve_twice_is_an_invalid_transition() {
    let app = setup().await;
    seed_pending(&app.pool, "p-1", "ord-1", 1_000).await;

    pending_orders::resolve(&app.pool, "p-1", "admin", None)
        .await
        .unwrap();
    let err = pending_orders::resolve(&app.pool, "p-1", "admin", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidTransition(_)));
    let order = pending_orders::find_by_id(&app.pool, "p-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, STATUS_RESOLVED, "first disposition sticks");
}

#[tokio::test]
async fn cancelled_order_cannot_be_resolved() {
    let app = setup().await;
    seed_pending(&app.pool, "p-1", "ord-1", 1_000).await;

    let cancelled = pending_orders::cancel(&app.pool, "p-1", "admin", Some("refunded"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, STATUS_CANCELLED);

    let err = pending_orders::resolve(&app.pool, "p-1", "admin", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn resolving_a_missing_order_is_not_found() {
    let app = setup().await;
    let err = pending_orders::resolve(&app.pool, "no-such-id", "admin", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn closed_orders_leave_the_review_queue() {
    let app = setup().await;
    seed_pending(&app.pool, "p-1", "ord-1", 1_000).await;
    seed_pending(&app.pool, "p-2", "ord-2", 2_000).await;

    pending_orders::resolve(&app.pool, "p-1", "admin", None)
        .await
        .unwrap();

    let review = pending_orders::find_needing_review(&app.pool).await.unwrap();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].id, "p-2");
}
