//! Study view: current card, flipping and advancing.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::domain::Flashcard;
use crate::session::{record_last_seen, NextOutcome, Phase, SessionState};
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct StudyView {
    /// "empty" or "showing"
    pub phase: &'static str,
    pub card: Option<Flashcard>,
    pub flipped: bool,
    pub filtered_count: usize,
    pub total_count: usize,
}

impl StudyView {
    pub fn of(session: &SessionState) -> Self {
        let (phase, card, flipped) = match session.phase() {
            Phase::Empty => ("empty", None, false),
            Phase::Showing { card, flipped } => ("showing", Some(card.clone()), flipped),
        };
        Self {
            phase,
            card,
            flipped,
            filtered_count: session.filtered_cards().len(),
            total_count: session.store().len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NextResponse {
    /// "shown", "empty" or "superseded"
    pub outcome: &'static str,
    #[serde(flatten)]
    pub study: StudyView,
}

/// GET /api/study
pub async fn study(State(state): State<AppState>) -> Result<Json<StudyView>, ApiError> {
    let session = state.lock_session()?;
    Ok(Json(StudyView::of(&session)))
}

/// POST /api/study/flip
pub async fn flip(State(state): State<AppState>) -> Result<Json<StudyView>, ApiError> {
    let mut session = state.lock_session()?;
    session.flip();
    Ok(Json(StudyView::of(&session)))
}

/// Hide the answer, wait out the transition, then draw.
/// Overlapping requests resolve to a single draw; earlier ones report "superseded".
///
/// POST /api/study/next
pub async fn next(State(state): State<AppState>) -> Result<Json<NextResponse>, ApiError> {
    let ticket = state.lock_session()?.begin_next();

    if !state.transition_delay.is_zero() {
        tokio::time::sleep(state.transition_delay).await;
    }

    let response = {
        let mut session = state.lock_session()?;
        let outcome = session.complete_next(ticket, state.backend.as_ref(), &mut rand::rng(), Utc::now());
        if let NextOutcome::Shown(touch) = outcome {
            record_last_seen(state.backend.clone(), touch);
        }
        NextResponse {
            outcome: match outcome {
                NextOutcome::Shown(_) => "shown",
                NextOutcome::Empty => "empty",
                NextOutcome::Superseded => "superseded",
            },
            study: StudyView::of(&session),
        }
    };
    Ok(Json(response))
}

/// Cards shown so far, in first-shown order.
///
/// GET /api/history
pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let session = state.lock_session()?;
    Ok(Json(session.history().cards().to_vec()))
}
