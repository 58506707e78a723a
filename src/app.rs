//! HTTP router.

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{cards, speech, study, tags, tips};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        // Cards
        .route("/api/cards", get(cards::list_cards).post(cards::create_card))
        .route("/api/cards/{id}", patch(cards::update_card).delete(cards::delete_card))
        // Tag filter
        .route("/api/tags", get(tags::list_tags).delete(tags::clear_tags))
        .route("/api/tags/{tag}/toggle", post(tags::toggle_tag))
        .route("/api/tag-emoji/{tag}", get(tags::emoji))
        // Study
        .route("/api/study", get(study::study))
        .route("/api/study/flip", post(study::flip))
        .route("/api/study/next", post(study::next))
        .route("/api/history", get(study::history))
        // Tips
        .route("/api/tips", get(tips::list_tips).post(tips::create_tip))
        .route("/api/tips/current", get(tips::current_tip))
        .route("/api/tips/next", post(tips::next_tip))
        .route("/api/tips/{id}", patch(tips::update_tip).delete(tips::delete_tip))
        // Speech
        .route("/api/speak", post(speech::speak))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
