//! Cards shown this session, in first-shown order.

use std::sync::Arc;

use crate::db::LogOnError;
use crate::domain::{CardId, Flashcard};
use crate::storage::KeyValueStorage;

/// Storage key for the serialized history
pub const HISTORY_KEY: &str = "viewedCards";

/// Append-only, id-deduplicated list of card snapshots.
///
/// Grows without bound for the life of the storage file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewedHistory {
    cards: Vec<Flashcard>,
}

impl ViewedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from storage; missing or corrupt data yields an empty history
    pub fn restore(storage: &dyn KeyValueStorage) -> Self {
        let Some(raw) = storage.get(HISTORY_KEY) else {
            return Self::new();
        };
        let cards: Vec<Flashcard> =
            serde_json::from_str(&raw).log_warn_default("Discarding corrupt viewed history");

        let mut history = Self::new();
        for card in cards {
            history.record(card);
        }
        tracing::debug!("Restored {} viewed cards", history.len());
        history
    }

    /// Write to storage. Failures are logged and dropped.
    pub fn save(&self, storage: &Arc<dyn KeyValueStorage>) {
        let Some(json) = serde_json::to_string(&self.cards).log_warn("Failed to encode viewed history")
        else {
            return;
        };
        storage
            .set(HISTORY_KEY, json)
            .log_warn("Failed to save viewed history");
    }

    /// Append a snapshot unless the id is already present.
    /// Returns true if the card was added.
    pub fn record(&mut self, card: Flashcard) -> bool {
        if self.contains(card.id) {
            return false;
        }
        self.cards.push(card);
        true
    }

    pub fn remove(&mut self, id: CardId) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.id != id);
        self.cards.len() != before
    }

    /// Keep only the cards for which `known` holds. Returns how many were dropped.
    pub fn retain_known(&mut self, known: impl Fn(CardId) -> bool) -> usize {
        let before = self.cards.len();
        self.cards.retain(|c| known(c.id));
        before - self.cards.len()
    }

    /// Replace the snapshot of an edited card, keeping its position
    pub fn patch(&mut self, card: &Flashcard) -> bool {
        match self.cards.iter_mut().find(|c| c.id == card.id) {
            Some(existing) => {
                *existing = card.clone();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|c| c.id == id)
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
