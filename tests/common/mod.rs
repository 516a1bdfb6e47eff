#![allow(dead_code)]

//! Shared test fixtures

use rosette_cloud::db::competitions::{self, Competition, CreateCompetition};
use rosette_cloud::{DbService, DomainEvent, EventDispatcher, OrderPayload};
use sqlx::SqlitePool;
use tokio::sync::broadcast;

pub struct TestApp {
    pub pool: SqlitePool,
    pub dispatcher: EventDispatcher,
    pub events: broadcast::Receiver<DomainEvent>,
    _tmp: tempfile::TempDir,
}

/// Fresh migrated database in a tempdir, plus a dispatcher with one
/// pre-subscribed receiver so no event can be missed.
pub async fn setup() -> TestApp {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db_path = tmp.path().join("test.db");
    let db = DbService::new(db_path.to_str().unwrap())
        .await
        .expect("test database");
    let dispatcher = EventDispatcher::new(64);
    let events = dispatcher.subscribe();
    TestApp {
        pool: db.pool,
        dispatcher,
        events,
        _tmp: tmp,
    }
}

pub async fn seed_competition(
    pool: &SqlitePool,
    event_id: &str,
    name: &str,
    competition_type: &str,
) -> Competition {
    competitions::create(
        pool,
        &CreateCompetition {
            event_id: event_id.into(),
            name: name.into(),
            competition_type: competition_type.into(),
            entry_opens_at: None,
            entry_closes_at: None,
        },
    )
    .await
    .expect("seed competition")
}

pub fn order(order_id: &str, competition_id: &str, email: &str, quantity: i64) -> OrderPayload {
    OrderPayload {
        external_order_id: order_id.into(),
        external_source: "shopfront".into(),
        competition_id: competition_id.into(),
        entrant_email: email.into(),
        entrant_name: Some("Test Entrant".into()),
        quantity,
        purchased_at: chrono::Utc::now(),
    }
}

pub async fn credit_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM entry_credit")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn pending_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM pending_order")
        .fetch_one(pool)
        .await
        .unwrap()
}
