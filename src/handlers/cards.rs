//! Card browsing and editing.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::domain::{CardDraft, CardId, CardPatch, Flashcard};
use crate::session::record_last_seen;
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    /// Only cards passing the current tag filter
    #[serde(default)]
    pub filtered: bool,
}

/// Cards in id order.
///
/// GET /api/cards?filtered=true
pub async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let session = state.lock_session()?;
    let cards = if query.filtered {
        session.filtered_cards().into_iter().cloned().collect()
    } else {
        session.store().cards().to_vec()
    };
    Ok(Json(cards))
}

/// POST /api/cards
pub async fn create_card(
    State(state): State<AppState>,
    Json(draft): Json<CardDraft>,
) -> Result<(StatusCode, Json<Flashcard>), ApiError> {
    let (card, touch) = state
        .lock_session()?
        .create_card(state.backend.as_ref(), draft, Utc::now())?;
    if let Some(touch) = touch {
        record_last_seen(state.backend.clone(), touch);
    }
    tracing::info!("Created card {}", card.id);
    Ok((StatusCode::CREATED, Json(card)))
}

/// PATCH /api/cards/{id}
pub async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
    Json(patch): Json<CardPatch>,
) -> Result<Json<Flashcard>, ApiError> {
    let card = state
        .lock_session()?
        .update_card(state.backend.as_ref(), id, patch)?;
    Ok(Json(card))
}

/// Deleting the card on screen draws its replacement immediately.
///
/// DELETE /api/cards/{id}
pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<StatusCode, ApiError> {
    let touch = state.lock_session()?.delete_card(
        state.backend.as_ref(),
        id,
        &mut rand::rng(),
        Utc::now(),
    )?;
    if let Some(touch) = touch {
        record_last_seen(state.backend.clone(), touch);
    }
    tracing::info!("Deleted card {}", id);
    Ok(StatusCode::NO_CONTENT)
}
