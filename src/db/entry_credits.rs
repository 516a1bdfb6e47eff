//! Entry credit store
//!
//! A credit is a consumable allotment of entries, sourced from exactly one
//! external order. The `UNIQUE (external_order_id, external_source)`
//! constraint is the idempotency guarantee for webhook redelivery.

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

pub const STATUS_ACTIVE: &str = "ACTIVE";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EntryCredit {
    pub id: String,
    pub entrant_id: String,
    pub competition_id: String,
    pub external_order_id: String,
    pub external_source: String,
    pub quantity: i64,
    pub used_count: i64,
    pub status: String,
    pub purchased_at: i64,
    pub created_at: i64,
}

impl EntryCredit {
    /// Entries still usable from this grant, always >= 0
    pub fn available(&self) -> i64 {
        self.quantity - self.used_count
    }
}

pub struct CreateEntryCredit<'a> {
    pub id: &'a str,
    pub entrant_id: &'a str,
    pub competition_id: &'a str,
    pub external_order_id: &'a str,
    pub external_source: &'a str,
    pub quantity: i64,
    pub purchased_at: i64,
    pub now: i64,
}

/// Insert a new ACTIVE credit. A unique-constraint violation means the
/// external order was already granted, the caller maps it to the
/// already-processed outcome.
pub async fn create(
    conn: &mut SqliteConnection,
    credit: &CreateEntryCredit<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO entry_credit (id, entrant_id, competition_id, external_order_id, external_source, quantity, used_count, status, purchased_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9)",
    )
    .bind(credit.id)
    .bind(credit.entrant_id)
    .bind(credit.competition_id)
    .bind(credit.external_order_id)
    .bind(credit.external_source)
    .bind(credit.quantity)
    .bind(STATUS_ACTIVE)
    .bind(credit.purchased_at)
    .bind(credit.now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_by_external_order(
    conn: &mut SqliteConnection,
    external_order_id: &str,
    external_source: &str,
) -> Result<Option<EntryCredit>, sqlx::Error> {
    sqlx::query_as::<_, EntryCredit>(
        "SELECT id, entrant_id, competition_id, external_order_id, external_source, quantity, used_count, status, purchased_at, created_at
         FROM entry_credit WHERE external_order_id = ?1 AND external_source = ?2",
    )
    .bind(external_order_id)
    .bind(external_source)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn find_by_entrant(
    pool: &SqlitePool,
    entrant_id: &str,
) -> Result<Vec<EntryCredit>, sqlx::Error> {
    sqlx::query_as::<_, EntryCredit>(
        "SELECT id, entrant_id, competition_id, external_order_id, external_source, quantity, used_count, status, purchased_at, created_at
         FROM entry_credit WHERE entrant_id = ? ORDER BY created_at DESC",
    )
    .bind(entrant_id)
    .fetch_all(pool)
    .await
}
