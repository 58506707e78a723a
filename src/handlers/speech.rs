use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::speech::speak_best_effort;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

/// Queue `text` for speech and return at once; outcomes are only logged.
///
/// POST /api/speak
pub async fn speak(State(state): State<AppState>, Json(request): Json<SpeakRequest>) -> StatusCode {
    let speaker = state.speaker.clone();
    tokio::task::spawn_blocking(move || speak_best_effort(speaker.as_ref(), &request.text));
    StatusCode::NO_CONTENT
}
