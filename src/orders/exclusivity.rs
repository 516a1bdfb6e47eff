//! Exclusivity rule checker
//!
//! An entrant may hold active credits in competitions of only one type per
//! parent event. The check is a read-only decision and must run on the same
//! transaction as the credit write so two orders for different types cannot
//! race past it.

use sqlx::SqliteConnection;

use crate::db::competitions::Competition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Ok,
    /// The entrant already holds an active credit for this competition type
    /// under the same event
    Conflict { held_type: String },
}

pub async fn check(
    conn: &mut SqliteConnection,
    entrant_id: &str,
    competition: &Competition,
) -> Result<Decision, sqlx::Error> {
    let held: Option<(String,)> = sqlx::query_as(
        "SELECT c.competition_type
         FROM entry_credit ec
         JOIN competition c ON c.id = ec.competition_id
         WHERE ec.entrant_id = ?1
           AND ec.status = ?2
           AND c.event_id = ?3
           AND c.competition_type <> ?4
         LIMIT 1",
    )
    .bind(entrant_id)
    .bind(crate::db::entry_credits::STATUS_ACTIVE)
    .bind(&competition.event_id)
    .bind(&competition.competition_type)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(match held {
        Some((held_type,)) => Decision::Conflict { held_type },
        None => Decision::Ok,
    })
}
