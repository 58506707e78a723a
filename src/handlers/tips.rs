use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::domain::{Tip, TipDraft, TipId, TipPatch};
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct CurrentTip {
    pub tip: Option<Tip>,
}

/// GET /api/tips
pub async fn list_tips(State(state): State<AppState>) -> Result<Json<Vec<Tip>>, ApiError> {
    Ok(Json(state.lock_tips()?.tips().to_vec()))
}

/// POST /api/tips
pub async fn create_tip(
    State(state): State<AppState>,
    Json(draft): Json<TipDraft>,
) -> Result<(StatusCode, Json<Tip>), ApiError> {
    let tip = state.lock_tips()?.create_tip(state.backend.as_ref(), draft)?;
    tracing::info!("Created tip {}", tip.id);
    Ok((StatusCode::CREATED, Json(tip)))
}

/// PATCH /api/tips/{id}
pub async fn update_tip(
    State(state): State<AppState>,
    Path(id): Path<TipId>,
    Json(patch): Json<TipPatch>,
) -> Result<Json<Tip>, ApiError> {
    let tip = state
        .lock_tips()?
        .update_tip(state.backend.as_ref(), id, patch)?;
    Ok(Json(tip))
}

/// DELETE /api/tips/{id}
pub async fn delete_tip(
    State(state): State<AppState>,
    Path(id): Path<TipId>,
) -> Result<StatusCode, ApiError> {
    state
        .lock_tips()?
        .delete_tip(state.backend.as_ref(), id, &mut rand::rng())?;
    tracing::info!("Deleted tip {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/tips/current
pub async fn current_tip(State(state): State<AppState>) -> Result<Json<CurrentTip>, ApiError> {
    let tips = state.lock_tips()?;
    Ok(Json(CurrentTip {
        tip: tips.current().cloned(),
    }))
}

/// Manual rotation; never repeats the tip on screen when another exists.
///
/// POST /api/tips/next
pub async fn next_tip(State(state): State<AppState>) -> Result<Json<CurrentTip>, ApiError> {
    let mut tips = state.lock_tips()?;
    let tip = tips.rotate(&mut rand::rng()).cloned();
    Ok(Json(CurrentTip { tip }))
}
