//! Study session state machine.
//!
//! A session is either `Empty` (nothing eligible to show) or `Showing` a card,
//! face up or flipped. The current card is held by id and always refers to a
//! card in the store.
//!
//! Advancing is split in two: [`SessionState::begin_next`] hides the answer
//! and hands out a [`NextTicket`]; the caller waits out the flip-back
//! transition and then calls [`SessionState::complete_next`]. Only the most
//! recently issued ticket may draw, so rapid clicks collapse into one draw.
//! Deleting the current card also invalidates outstanding tickets.
//!
//! Showing a card yields a [`LastSeenTouch`]. Persisting it is best-effort and
//! happens off the request path via [`record_last_seen`].

pub mod history;

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::backend::Backend;
use crate::db::LogOnError;
use crate::domain::{CardDraft, CardId, CardPatch, Flashcard};
use crate::error::StoreError;
use crate::filter::{self, TagFilter};
use crate::srs::selector;
use crate::storage::KeyValueStorage;
use crate::store::CardStore;

pub use history::{ViewedHistory, HISTORY_KEY};

/// Pool size asked of the backend when server-side candidates are enabled
pub const DEFAULT_CANDIDATE_POOL_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
  /// Draw uniformly from the backend's pre-ranked pool instead of weighting locally
  pub server_candidates: bool,
  pub candidate_pool_size: usize,
}

impl Default for SessionOptions {
  fn default() -> Self {
    Self {
      server_candidates: false,
      candidate_pool_size: DEFAULT_CANDIDATE_POOL_SIZE,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase<'a> {
  Empty,
  Showing { card: &'a Flashcard, flipped: bool },
}

/// A card was shown at `at`; the backend should hear about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastSeenTouch {
  pub card_id: CardId,
  pub at: DateTime<Utc>,
}

/// Permission to complete one pending `next`. Consumed on use.
#[derive(Debug, PartialEq, Eq)]
pub struct NextTicket {
  generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutcome {
  Shown(LastSeenTouch),
  /// Nothing in the filtered set
  Empty,
  /// A later `next` or a delete got there first; nothing changed
  Superseded,
}

pub struct SessionState {
  store: CardStore,
  filter: TagFilter,
  current: Option<CardId>,
  flipped: bool,
  history: ViewedHistory,
  storage: Arc<dyn KeyValueStorage>,
  generation: u64,
  options: SessionOptions,
}

impl SessionState {
  /// Wrap a loaded store, restoring the viewed history from `storage`.
  /// Restored cards the store no longer holds are dropped.
  pub fn new(store: CardStore, storage: Arc<dyn KeyValueStorage>, options: SessionOptions) -> Self {
    let mut history = ViewedHistory::restore(storage.as_ref());
    let dropped = history.retain_known(|id| store.contains(id));
    if dropped > 0 {
      tracing::debug!("Dropped {} deleted cards from viewed history", dropped);
      history.save(&storage);
    }
    Self {
      store,
      filter: TagFilter::new(),
      current: None,
      flipped: false,
      history,
      storage,
      generation: 0,
      options,
    }
  }

  /// Pick the first card of the session
  pub fn initialize<R: Rng + ?Sized>(
    &mut self,
    backend: &dyn Backend,
    rng: &mut R,
    now: DateTime<Utc>,
  ) -> Option<LastSeenTouch> {
    self.select(backend, rng, now)
  }

  /// Toggle the answer side. Returns the new flip state, or None when empty.
  pub fn flip(&mut self) -> Option<bool> {
    self.current?;
    self.flipped = !self.flipped;
    Some(self.flipped)
  }

  /// Hide the answer and reserve the next draw
  pub fn begin_next(&mut self) -> NextTicket {
    self.flipped = false;
    self.generation += 1;
    NextTicket {
      generation: self.generation,
    }
  }

  /// Draw from the current filtered set if `ticket` is still the latest
  pub fn complete_next<R: Rng + ?Sized>(
    &mut self,
    ticket: NextTicket,
    backend: &dyn Backend,
    rng: &mut R,
    now: DateTime<Utc>,
  ) -> NextOutcome {
    if ticket.generation != self.generation {
      tracing::debug!(
        "Discarding stale next (ticket {}, current {})",
        ticket.generation,
        self.generation
      );
      return NextOutcome::Superseded;
    }
    match self.select(backend, rng, now) {
      Some(touch) => NextOutcome::Shown(touch),
      None => NextOutcome::Empty,
    }
  }

  /// Toggle a tag in the filter. The current card stays until the next draw.
  pub fn toggle_tag(&mut self, tag: &str) -> bool {
    self.filter.toggle(tag)
  }

  pub fn clear_tags(&mut self) {
    self.filter.clear();
  }

  /// Create a card. An empty session shows it right away if it passes the filter.
  pub fn create_card(
    &mut self,
    backend: &dyn Backend,
    draft: CardDraft,
    now: DateTime<Utc>,
  ) -> Result<(Flashcard, Option<LastSeenTouch>), StoreError> {
    let card = self.store.create(backend, draft)?;
    let eligible = !self.filter.is_active() || card.has_any_tag(self.filter.selected());
    let touch = if self.current.is_none() && eligible {
      self.flipped = false;
      Some(self.show(card.id, now))
    } else {
      None
    };
    Ok((card, touch))
  }

  /// Edit a card in place; selection and flip state are untouched
  pub fn update_card(
    &mut self,
    backend: &dyn Backend,
    id: CardId,
    patch: CardPatch,
  ) -> Result<Flashcard, StoreError> {
    let card = self.store.update(backend, id, patch)?;
    if self.history.patch(&card) {
      self.history.save(&self.storage);
    }
    Ok(card)
  }

  /// Delete a card, dropping it from history and replacing it if it was showing
  pub fn delete_card<R: Rng + ?Sized>(
    &mut self,
    backend: &dyn Backend,
    id: CardId,
    rng: &mut R,
    now: DateTime<Utc>,
  ) -> Result<Option<LastSeenTouch>, StoreError> {
    self.store.delete(backend, id)?;
    if self.history.remove(id) {
      self.history.save(&self.storage);
    }

    if self.current != Some(id) {
      return Ok(None);
    }
    tracing::debug!("Current card {} deleted, reselecting", id);
    self.generation += 1;
    Ok(self.select(backend, rng, now))
  }

  pub fn phase(&self) -> Phase<'_> {
    match self.current_card() {
      Some(card) => Phase::Showing {
        card,
        flipped: self.flipped,
      },
      None => Phase::Empty,
    }
  }

  pub fn current_card(&self) -> Option<&Flashcard> {
    self.current.and_then(|id| self.store.get(id))
  }

  pub fn is_flipped(&self) -> bool {
    self.flipped
  }

  pub fn store(&self) -> &CardStore {
    &self.store
  }

  pub fn selected_tags(&self) -> &BTreeSet<String> {
    self.filter.selected()
  }

  pub fn filter(&self) -> &TagFilter {
    &self.filter
  }

  pub fn filtered_cards(&self) -> Vec<&Flashcard> {
    self.filter.apply(self.store.cards())
  }

  pub fn all_tags(&self) -> BTreeSet<String> {
    filter::all_tags(self.store.cards())
  }

  pub fn history(&self) -> &ViewedHistory {
    &self.history
  }

  pub fn options(&self) -> SessionOptions {
    self.options
  }

  fn select<R: Rng + ?Sized>(
    &mut self,
    backend: &dyn Backend,
    rng: &mut R,
    now: DateTime<Utc>,
  ) -> Option<LastSeenTouch> {
    self.flipped = false;
    match self.draw(backend, rng, now) {
      Some(id) => Some(self.show(id, now)),
      None => {
        self.current = None;
        tracing::debug!("No cards match the current filter");
        None
      }
    }
  }

  fn draw<R: Rng + ?Sized>(&self, backend: &dyn Backend, rng: &mut R, now: DateTime<Utc>) -> Option<CardId> {
    let filtered = self.filtered_cards();
    if filtered.is_empty() {
      return None;
    }
    if self.options.server_candidates {
      if let Some(id) = self.draw_from_candidates(backend, &filtered, rng) {
        return Some(id);
      }
    }
    selector::select_weighted(&filtered, now, rng).map(|c| c.id)
  }

  /// Uniform draw over the backend's pool, limited to the filtered set
  fn draw_from_candidates<R: Rng + ?Sized>(
    &self,
    backend: &dyn Backend,
    filtered: &[&Flashcard],
    rng: &mut R,
  ) -> Option<CardId> {
    let pool = backend
      .weighted_candidates(self.filter.selected(), self.options.candidate_pool_size)
      .log_warn("Candidate query failed, weighting locally")?;
    let eligible: Vec<&Flashcard> = filtered
      .iter()
      .copied()
      .filter(|card| pool.iter().any(|p| p.id == card.id))
      .collect();
    selector::select_uniform(&eligible, rng).map(|c| c.id)
  }

  fn show(&mut self, id: CardId, now: DateTime<Utc>) -> LastSeenTouch {
    self.current = Some(id);
    self.store.mark_seen(id, now);
    if let Some(card) = self.store.get(id) {
      if self.history.record(card.clone()) {
        self.history.save(&self.storage);
      }
    }
    tracing::debug!("Showing card {}", id);
    LastSeenTouch { card_id: id, at: now }
  }
}

/// Persist a last-seen timestamp in the background. Failures are logged only.
pub fn record_last_seen(backend: Arc<dyn Backend>, touch: LastSeenTouch) -> tokio::task::JoinHandle<()> {
  tokio::task::spawn_blocking(move || {
    backend
      .touch_last_seen(touch.card_id, touch.at)
      .log_warn(&format!("Failed to record last seen for card {}", touch.card_id));
  })
}
