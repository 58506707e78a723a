//! Application state shared by all handlers.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::backend::Backend;
use crate::handlers::ApiError;
use crate::session::SessionState;
use crate::speech::Speaker;
use crate::tips::TipRotator;

/// Application state passed to all handlers.
///
/// Session and tip state sit behind std mutexes; handlers take a lock, run
/// one operation to completion and release it before any `.await`.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SessionState>>,
    pub tips: Arc<Mutex<TipRotator>>,
    pub backend: Arc<dyn Backend>,
    pub speaker: Arc<dyn Speaker>,
    /// Pause between hiding an answer and drawing the next card
    pub transition_delay: Duration,
}

impl AppState {
    pub fn new(
        session: SessionState,
        tips: Arc<Mutex<TipRotator>>,
        backend: Arc<dyn Backend>,
        speaker: Arc<dyn Speaker>,
        transition_delay: Duration,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tips,
            backend,
            speaker,
            transition_delay,
        }
    }

    pub fn lock_session(&self) -> Result<MutexGuard<'_, SessionState>, ApiError> {
        self.session.lock().map_err(|_| {
            tracing::error!("Session lock poisoned");
            ApiError::Internal("session unavailable".to_string())
        })
    }

    pub fn lock_tips(&self) -> Result<MutexGuard<'_, TipRotator>, ApiError> {
        self.tips.lock().map_err(|_| {
            tracing::error!("Tip rotator lock poisoned");
            ApiError::Internal("tips unavailable".to_string())
        })
    }
}
