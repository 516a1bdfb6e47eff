//! Entrant store

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use super::{new_id, now_millis};

/// A person registered to enter competitions
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Entrant {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Find-or-create an entrant by email. An existing entrant keeps its id;
/// a supplied name refreshes the profile.
pub async fn upsert_by_email(
    conn: &mut SqliteConnection,
    email: &str,
    name: Option<&str>,
) -> Result<Entrant, sqlx::Error> {
    let now = now_millis();
    let id = new_id();
    sqlx::query(
        "INSERT INTO entrant (id, email, name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(email) DO UPDATE SET
            name = COALESCE(excluded.name, entrant.name),
            updated_at = ?4",
    )
    .bind(&id)
    .bind(email)
    .bind(name)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    sqlx::query_as::<_, Entrant>(
        "SELECT id, email, name, created_at, updated_at FROM entrant WHERE email = ?",
    )
    .bind(email)
    .fetch_one(&mut *conn)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Entrant>, sqlx::Error> {
    sqlx::query_as::<_, Entrant>(
        "SELECT id, email, name, created_at, updated_at FROM entrant WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Entrant>, sqlx::Error> {
    sqlx::query_as::<_, Entrant>(
        "SELECT id, email, name, created_at, updated_at FROM entrant WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}
