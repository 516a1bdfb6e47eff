//! Entrant API handlers

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use validator::Validate;

use crate::db::entrants::{self, Entrant};
use crate::db::entry_credits::{self, EntryCredit};
use crate::error::{AppError, AppResponse, AppResult, ok};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEntrant {
    #[validate(email)]
    pub email: String,
    pub name: Option<String>,
}

/// Entrant detail response (entrant + credit grants)
#[derive(serde::Serialize)]
pub struct EntrantDetail {
    #[serde(flatten)]
    pub entrant: Entrant,
    pub credits: Vec<EntryCredit>,
}

/// POST /api/entrants — explicit registration (find-or-create by email)
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterEntrant>,
) -> AppResult<Json<AppResponse<Entrant>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state.pool.acquire().await?;
    let entrant =
        entrants::upsert_by_email(&mut conn, &payload.email, payload.name.as_deref()).await?;
    Ok(ok(entrant))
}

/// GET /api/entrants/{id} — entrant with their credit grants
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<EntrantDetail>>> {
    let entrant = entrants::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Entrant {id}")))?;

    let credits = entry_credits::find_by_entrant(&state.pool, &id).await?;

    Ok(ok(EntrantDetail { entrant, credits }))
}
