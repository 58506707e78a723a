//! Test utilities: an in-memory backend with failure injection, and a
//! SQLite-backed environment in a temporary directory.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::backend::{Backend, SqliteBackend};
use crate::domain::{CardDraft, CardId, CardPatch, Flashcard, Tip, TipDraft, TipId, TipPatch};
use crate::error::BackendError;

#[derive(Default)]
struct Inner {
    cards: Vec<Flashcard>,
    tips: Vec<Tip>,
    touches: Vec<(CardId, DateTime<Utc>)>,
    next_id: i64,
}

/// [`Backend`] held entirely in memory.
///
/// `fail_all` makes every call return `BackendError::Unavailable`;
/// `fail_touch` and `fail_candidates` only affect those calls.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    fail_all: AtomicBool,
    fail_touch: AtomicBool,
    fail_candidates: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_cards(Vec::new())
    }

    pub fn with_cards(cards: Vec<Flashcard>) -> Self {
        let next_id = cards.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(Inner {
                cards,
                next_id,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn with_tips(tips: Vec<Tip>) -> Self {
        let backend = Self::new();
        {
            let mut inner = backend.inner.lock().unwrap();
            inner.next_id = tips.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            inner.tips = tips;
        }
        backend
    }

    /// Card created long ago and never shown
    pub fn card(id: CardId, tags: &[&str]) -> Flashcard {
        Flashcard {
            id,
            question: format!("q{}", id),
            answer: format!("a{}", id),
            example: None,
            example_translation: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            notes: None,
            last_seen: None,
            created_at: Utc::now() - Duration::days(400),
        }
    }

    pub fn tip(id: TipId) -> Tip {
        Tip {
            id,
            title: format!("Tip {}", id),
            content: format!("Content {}", id),
            category: None,
            tags: Vec::new(),
        }
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn fail_touch(&self, fail: bool) {
        self.fail_touch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_candidates(&self, fail: bool) {
        self.fail_candidates.store(fail, Ordering::SeqCst);
    }

    /// Number of backend calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn cards(&self) -> Vec<Flashcard> {
        self.inner.lock().unwrap().cards.clone()
    }

    pub fn tips(&self) -> Vec<Tip> {
        self.inner.lock().unwrap().tips.clone()
    }

    pub fn touches(&self) -> Vec<(CardId, DateTime<Utc>)> {
        self.inner.lock().unwrap().touches.clone()
    }

    fn enter(&self, extra_failure: Option<&AtomicBool>) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let extra = extra_failure.is_some_and(|f| f.load(Ordering::SeqCst));
        if self.fail_all.load(Ordering::SeqCst) || extra {
            return Err(BackendError::Unavailable);
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn list_cards(&self) -> Result<Vec<Flashcard>, BackendError> {
        self.enter(None)?;
        let mut cards = self.cards();
        cards.sort_by_key(|c| c.id);
        Ok(cards)
    }

    fn insert_card(&self, draft: &CardDraft) -> Result<Flashcard, BackendError> {
        self.enter(None)?;
        let mut inner = self.inner.lock().unwrap();
        let card = Flashcard {
            id: inner.next_id,
            question: draft.question.clone(),
            answer: draft.answer.clone(),
            example: draft.example.clone(),
            example_translation: draft.example_translation.clone(),
            tags: draft.tags.clone(),
            notes: draft.notes.clone(),
            last_seen: None,
            created_at: Utc::now(),
        };
        inner.next_id += 1;
        inner.cards.push(card.clone());
        Ok(card)
    }

    fn update_card(&self, id: CardId, patch: &CardPatch) -> Result<(), BackendError> {
        self.enter(None)?;
        let mut inner = self.inner.lock().unwrap();
        let card = inner
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(BackendError::Missing(id))?;
        card.apply(patch);
        Ok(())
    }

    fn delete_card(&self, id: CardId) -> Result<(), BackendError> {
        self.enter(None)?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.cards.len();
        inner.cards.retain(|c| c.id != id);
        if inner.cards.len() == before {
            return Err(BackendError::Missing(id));
        }
        Ok(())
    }

    fn touch_last_seen(&self, id: CardId, at: DateTime<Utc>) -> Result<(), BackendError> {
        self.enter(Some(&self.fail_touch))?;
        let mut inner = self.inner.lock().unwrap();
        let card = inner
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(BackendError::Missing(id))?;
        card.last_seen = Some(at);
        inner.touches.push((id, at));
        Ok(())
    }

    fn weighted_candidates(
        &self,
        tags: &BTreeSet<String>,
        count: usize,
    ) -> Result<Vec<Flashcard>, BackendError> {
        self.enter(Some(&self.fail_candidates))?;
        let mut pool: Vec<Flashcard> = self
            .cards()
            .into_iter()
            .filter(|c| tags.is_empty() || c.has_any_tag(tags))
            .collect();
        pool.sort_by_key(|c| (c.last_seen.is_some(), c.last_seen, c.id));
        pool.truncate(count);
        Ok(pool)
    }

    fn list_tips(&self) -> Result<Vec<Tip>, BackendError> {
        self.enter(None)?;
        Ok(self.tips())
    }

    fn insert_tip(&self, draft: &TipDraft) -> Result<Tip, BackendError> {
        self.enter(None)?;
        let mut inner = self.inner.lock().unwrap();
        let tip = Tip {
            id: inner.next_id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            category: draft.category.clone(),
            tags: draft.tags.clone(),
        };
        inner.next_id += 1;
        inner.tips.push(tip.clone());
        Ok(tip)
    }

    fn update_tip(&self, id: TipId, patch: &TipPatch) -> Result<(), BackendError> {
        self.enter(None)?;
        let mut inner = self.inner.lock().unwrap();
        let tip = inner
            .tips
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(BackendError::Missing(id))?;
        tip.apply(patch);
        Ok(())
    }

    fn delete_tip(&self, id: TipId) -> Result<(), BackendError> {
        self.enter(None)?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.tips.len();
        inner.tips.retain(|t| t.id != id);
        if inner.tips.len() == before {
            return Err(BackendError::Missing(id));
        }
        Ok(())
    }
}

/// SQLite database in a temporary directory.
///
/// Uses the authoritative schema initialization (`db::init_db`), so tests
/// exercise the same migrations as production.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub backend: SqliteBackend,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let pool = crate::db::init_db(&temp.path().join("flashcards.db"))?;
        Ok(Self {
            temp,
            backend: SqliteBackend::new(pool),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        self.temp.path()
    }
}
