//! Competition directory handlers

use axum::Json;
use axum::extract::State;

use crate::db::competitions::{self, Competition, CreateCompetition};
use crate::error::{AppError, AppResponse, AppResult, ok};
use crate::state::AppState;

/// GET /api/competitions
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<AppResponse<Vec<Competition>>>> {
    let competitions = competitions::find_all(&state.pool).await?;
    Ok(ok(competitions))
}

/// POST /api/competitions — seed the directory
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateCompetition>,
) -> AppResult<Json<AppResponse<Competition>>> {
    if payload.name.is_empty() || payload.event_id.is_empty() || payload.competition_type.is_empty()
    {
        return Err(AppError::validation(
            "name, eventId and competitionType must not be empty",
        ));
    }
    let competition = competitions::create(&state.pool, &payload).await?;
    tracing::info!(
        competition_id = %competition.id,
        event_id = %competition.event_id,
        competition_type = %competition.competition_type,
        "Competition created"
    );
    Ok(ok(competition))
}
