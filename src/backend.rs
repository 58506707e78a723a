//! Persistence backend seam.
//!
//! The store, session and tip rotator only talk to persistence through
//! [`Backend`]. [`SqliteBackend`] is the production implementation over a
//! shared rusqlite connection.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::db::{self, DbPool};
use crate::domain::{CardDraft, CardId, CardPatch, Flashcard, Tip, TipDraft, TipId, TipPatch};
use crate::error::BackendError;

pub trait Backend: Send + Sync {
    /// Every card, ordered by id ascending
    fn list_cards(&self) -> Result<Vec<Flashcard>, BackendError>;

    /// Persist a validated draft; the backend assigns `id` and `created_at`
    fn insert_card(&self, draft: &CardDraft) -> Result<Flashcard, BackendError>;

    /// Merge a normalized patch into the stored card
    fn update_card(&self, id: CardId, patch: &CardPatch) -> Result<(), BackendError>;

    fn delete_card(&self, id: CardId) -> Result<(), BackendError>;

    /// Record when a card was shown. Callers treat this as best-effort.
    fn touch_last_seen(&self, id: CardId, at: DateTime<Utc>) -> Result<(), BackendError>;

    /// Pre-filtered candidate pool, stalest cards first
    fn weighted_candidates(
        &self,
        tags: &BTreeSet<String>,
        count: usize,
    ) -> Result<Vec<Flashcard>, BackendError>;

    fn list_tips(&self) -> Result<Vec<Tip>, BackendError>;

    fn insert_tip(&self, draft: &TipDraft) -> Result<Tip, BackendError>;

    fn update_tip(&self, id: TipId, patch: &TipPatch) -> Result<(), BackendError>;

    fn delete_tip(&self, id: TipId) -> Result<(), BackendError>;
}

/// [`Backend`] over a SQLite database
#[derive(Clone)]
pub struct SqliteBackend {
    pool: DbPool,
}

impl SqliteBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl Backend for SqliteBackend {
    fn list_cards(&self) -> Result<Vec<Flashcard>, BackendError> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::list_cards(&conn)?)
    }

    fn insert_card(&self, draft: &CardDraft) -> Result<Flashcard, BackendError> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::insert_card(&conn, draft, Utc::now())?)
    }

    fn update_card(&self, id: CardId, patch: &CardPatch) -> Result<(), BackendError> {
        let conn = db::try_lock(&self.pool)?;
        let mut card = db::get_card_by_id(&conn, id)?.ok_or(BackendError::Missing(id))?;
        card.apply(patch);
        if db::update_card(&conn, &card)? {
            Ok(())
        } else {
            Err(BackendError::Missing(id))
        }
    }

    fn delete_card(&self, id: CardId) -> Result<(), BackendError> {
        let conn = db::try_lock(&self.pool)?;
        if db::delete_card(&conn, id)? {
            Ok(())
        } else {
            Err(BackendError::Missing(id))
        }
    }

    fn touch_last_seen(&self, id: CardId, at: DateTime<Utc>) -> Result<(), BackendError> {
        let conn = db::try_lock(&self.pool)?;
        if db::touch_last_seen(&conn, id, at)? {
            Ok(())
        } else {
            Err(BackendError::Missing(id))
        }
    }

    fn weighted_candidates(
        &self,
        tags: &BTreeSet<String>,
        count: usize,
    ) -> Result<Vec<Flashcard>, BackendError> {
        let conn = db::try_lock(&self.pool)?;
        let tags: Vec<String> = tags.iter().cloned().collect();
        Ok(db::get_weighted_candidates(&conn, &tags, count)?)
    }

    fn list_tips(&self) -> Result<Vec<Tip>, BackendError> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::list_tips(&conn)?)
    }

    fn insert_tip(&self, draft: &TipDraft) -> Result<Tip, BackendError> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::insert_tip(&conn, draft)?)
    }

    fn update_tip(&self, id: TipId, patch: &TipPatch) -> Result<(), BackendError> {
        let conn = db::try_lock(&self.pool)?;
        let mut tip = db::get_tip_by_id(&conn, id)?.ok_or(BackendError::Missing(id))?;
        tip.apply(patch);
        if db::update_tip(&conn, &tip)? {
            Ok(())
        } else {
            Err(BackendError::Missing(id))
        }
    }

    fn delete_tip(&self, id: TipId) -> Result<(), BackendError> {
        let conn = db::try_lock(&self.pool)?;
        if db::delete_tip(&conn, id)? {
            Ok(())
        } else {
            Err(BackendError::Missing(id))
        }
    }
}
