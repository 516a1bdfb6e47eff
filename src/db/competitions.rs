//! Competition directory
//!
//! Read-only from the order engine's perspective; rows are seeded through
//! the admin API.

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use super::{new_id, now_millis};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: String,
    pub event_id: String,
    pub name: String,
    /// Category used by the exclusivity rule, e.g. "home" | "commercial"
    pub competition_type: String,
    pub entry_opens_at: Option<i64>,
    pub entry_closes_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompetition {
    pub event_id: String,
    pub name: String,
    pub competition_type: String,
    pub entry_opens_at: Option<i64>,
    pub entry_closes_at: Option<i64>,
}

pub async fn create(pool: &SqlitePool, data: &CreateCompetition) -> Result<Competition, sqlx::Error> {
    let id = new_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO competition (id, event_id, name, competition_type, entry_opens_at, entry_closes_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&id)
    .bind(&data.event_id)
    .bind(&data.name)
    .bind(&data.competition_type)
    .bind(data.entry_opens_at)
    .bind(data.entry_closes_at)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Competition {
        id,
        event_id: data.event_id.clone(),
        name: data.name.clone(),
        competition_type: data.competition_type.clone(),
        entry_opens_at: data.entry_opens_at,
        entry_closes_at: data.entry_closes_at,
        created_at: now,
    })
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Competition>, sqlx::Error> {
    sqlx::query_as::<_, Competition>(
        "SELECT id, event_id, name, competition_type, entry_opens_at, entry_closes_at, created_at
         FROM competition ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Competition>, sqlx::Error> {
    sqlx::query_as::<_, Competition>(
        "SELECT id, event_id, name, competition_type, entry_opens_at, entry_closes_at, created_at
         FROM competition WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}
