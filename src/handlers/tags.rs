//! Tag filter endpoints.
//!
//! Changing the filter never replaces the card on screen; the new filter
//! applies from the next draw.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::tag_emoji;
use crate::session::SessionState;
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct TagsView {
    pub all: BTreeSet<String>,
    pub selected: BTreeSet<String>,
    pub filtered_count: usize,
}

impl TagsView {
    fn of(session: &SessionState) -> Self {
        Self {
            all: session.all_tags(),
            selected: session.selected_tags().clone(),
            filtered_count: session.filtered_cards().len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagEmoji {
    pub tag: String,
    pub emoji: &'static str,
}

/// GET /api/tags
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<TagsView>, ApiError> {
    let session = state.lock_session()?;
    Ok(Json(TagsView::of(&session)))
}

/// POST /api/tags/{tag}/toggle
pub async fn toggle_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<TagsView>, ApiError> {
    let mut session = state.lock_session()?;
    let selected = session.toggle_tag(&tag);
    tracing::debug!("Tag {} {}", tag, if selected { "selected" } else { "deselected" });
    Ok(Json(TagsView::of(&session)))
}

/// DELETE /api/tags
pub async fn clear_tags(State(state): State<AppState>) -> Result<Json<TagsView>, ApiError> {
    let mut session = state.lock_session()?;
    session.clear_tags();
    Ok(Json(TagsView::of(&session)))
}

/// GET /api/tag-emoji/{tag}
pub async fn emoji(Path(tag): Path<String>) -> Json<TagEmoji> {
    let emoji = tag_emoji(&tag);
    Json(TagEmoji { tag, emoji })
}
