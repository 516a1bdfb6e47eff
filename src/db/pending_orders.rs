//! Pending order queue
//!
//! Orders the engine could not auto-resolve, awaiting a human decision.
//! `RESOLVED` and `CANCELLED` are terminal; resolve/cancel use a
//! compare-and-set on the current status so a double resolution loses.

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use super::now_millis;
use crate::error::AppError;

pub const STATUS_NEEDS_REVIEW: &str = "NEEDS_REVIEW";
pub const STATUS_RESOLVED: &str = "RESOLVED";
pub const STATUS_CANCELLED: &str = "CANCELLED";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub id: String,
    pub external_order_id: String,
    pub external_source: String,
    pub competition_id: String,
    pub entrant_id: Option<String>,
    pub reason: String,
    pub status: String,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}

const PENDING_ORDER_SELECT: &str = "SELECT id, external_order_id, external_source, competition_id, entrant_id, reason, status, resolved_by, resolution_notes, created_at, resolved_at FROM pending_order";

pub struct CreatePendingOrder<'a> {
    pub id: &'a str,
    pub external_order_id: &'a str,
    pub external_source: &'a str,
    pub competition_id: &'a str,
    pub entrant_id: Option<&'a str>,
    pub reason: &'a str,
    pub now: i64,
}

pub async fn create(
    conn: &mut SqliteConnection,
    order: &CreatePendingOrder<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO pending_order (id, external_order_id, external_source, competition_id, entrant_id, reason, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(order.id)
    .bind(order.external_order_id)
    .bind(order.external_source)
    .bind(order.competition_id)
    .bind(order.entrant_id)
    .bind(order.reason)
    .bind(STATUS_NEEDS_REVIEW)
    .bind(order.now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Latest pending order for a source-system order key, any status.
/// A closed review still counts as a terminal disposition of the key.
pub async fn find_by_external_order(
    conn: &mut SqliteConnection,
    external_order_id: &str,
    external_source: &str,
) -> Result<Option<PendingOrder>, sqlx::Error> {
    let sql = format!(
        "{PENDING_ORDER_SELECT} WHERE external_order_id = ?1 AND external_source = ?2 ORDER BY created_at DESC LIMIT 1"
    );
    sqlx::query_as::<_, PendingOrder>(&sql)
        .bind(external_order_id)
        .bind(external_source)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<PendingOrder>, sqlx::Error> {
    let sql = format!("{PENDING_ORDER_SELECT} WHERE id = ?");
    sqlx::query_as::<_, PendingOrder>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All orders awaiting review, oldest first for fair triage
pub async fn find_needing_review(pool: &SqlitePool) -> Result<Vec<PendingOrder>, sqlx::Error> {
    let sql = format!("{PENDING_ORDER_SELECT} WHERE status = ? ORDER BY created_at ASC");
    sqlx::query_as::<_, PendingOrder>(&sql)
        .bind(STATUS_NEEDS_REVIEW)
        .fetch_all(pool)
        .await
}

/// `NEEDS_REVIEW -> RESOLVED`. Does not grant credits; any grant after a
/// resolution is a separate administrative action.
pub async fn resolve(
    pool: &SqlitePool,
    id: &str,
    resolved_by: &str,
    notes: Option<&str>,
) -> Result<PendingOrder, AppError> {
    close(pool, id, STATUS_RESOLVED, resolved_by, notes).await
}

/// `NEEDS_REVIEW -> CANCELLED`
pub async fn cancel(
    pool: &SqlitePool,
    id: &str,
    resolved_by: &str,
    notes: Option<&str>,
) -> Result<PendingOrder, AppError> {
    close(pool, id, STATUS_CANCELLED, resolved_by, notes).await
}

async fn close(
    pool: &SqlitePool,
    id: &str,
    status: &str,
    resolved_by: &str,
    notes: Option<&str>,
) -> Result<PendingOrder, AppError> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE pending_order
         SET status = ?2, resolved_by = ?3, resolution_notes = ?4, resolved_at = ?5
         WHERE id = ?1 AND status = ?6",
    )
    .bind(id)
    .bind(status)
    .bind(resolved_by)
    .bind(notes)
    .bind(now)
    .bind(STATUS_NEEDS_REVIEW)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_by_id(pool, id).await? {
            None => Err(AppError::not_found(format!("Pending order {id}"))),
            Some(existing) => Err(AppError::invalid_transition(format!(
                "pending order {id} is already {}",
                existing.status
            ))),
        };
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::database(format!("Pending order {id} vanished after update")))
}
