//! In-memory card set, kept consistent with the backend.
//!
//! Loaded once at startup. Every mutation goes to the backend first and only
//! touches memory once the backend call succeeded, so a failed write leaves
//! the store exactly as it was.

use chrono::{DateTime, Utc};

use crate::backend::Backend;
use crate::domain::{CardDraft, CardId, CardPatch, Flashcard};
use crate::error::{LoadError, StoreError};

#[derive(Debug, Clone, Default)]
pub struct CardStore {
    cards: Vec<Flashcard>,
}

impl CardStore {
    /// Build a store from a snapshot, ordered by id
    pub fn new(mut cards: Vec<Flashcard>) -> Self {
        cards.sort_by_key(|c| c.id);
        Self { cards }
    }

    /// Fetch every card from the backend
    pub fn load(backend: &dyn Backend) -> Result<Self, LoadError> {
        let cards = backend.list_cards().map_err(LoadError::Cards)?;
        tracing::info!("Loaded {} cards", cards.len());
        Ok(Self::new(cards))
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn get(&self, id: CardId) -> Option<&Flashcard> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn create(&mut self, backend: &dyn Backend, draft: CardDraft) -> Result<Flashcard, StoreError> {
        let draft = draft.validated()?;
        let card = backend.insert_card(&draft)?;
        tracing::debug!("Created card {} ({})", card.id, card.question);
        self.cards.push(card.clone());
        Ok(card)
    }

    /// Merge `patch` into card `id` and return the updated card
    pub fn update(
        &mut self,
        backend: &dyn Backend,
        id: CardId,
        patch: CardPatch,
    ) -> Result<Flashcard, StoreError> {
        let index = self.index_of(id).ok_or(StoreError::NotFound(id))?;
        let patch = patch.normalized();
        if patch.is_empty() {
            return Ok(self.cards[index].clone());
        }

        let mut updated = self.cards[index].clone();
        updated.apply(&patch);
        updated.validate()?;

        backend.update_card(id, &patch)?;
        self.cards[index] = updated.clone();
        Ok(updated)
    }

    /// Remove card `id` and return it
    pub fn delete(&mut self, backend: &dyn Backend, id: CardId) -> Result<Flashcard, StoreError> {
        let index = self.index_of(id).ok_or(StoreError::NotFound(id))?;
        backend.delete_card(id)?;
        let removed = self.cards.remove(index);
        tracing::debug!("Deleted card {}", id);
        Ok(removed)
    }

    /// Local counterpart of the backend's last-seen write
    pub fn mark_seen(&mut self, id: CardId, at: DateTime<Utc>) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.cards[index].last_seen = Some(at);
                true
            }
            None => false,
        }
    }

    fn index_of(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }
}
