//! One-time import of a JSON deck into an empty database.
//!
//! The seed files are plain JSON arrays of card drafts (or tip drafts).
//! Import is skipped when the table already has rows, and entries that fail
//! validation are logged and skipped rather than aborting the import.

use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;

use super::{count_cards, count_tips, insert_card, insert_tip};
use crate::domain::{CardDraft, TipDraft};
use crate::error::SeedError;

fn read_seed<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SeedError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Import cards from `path` if the flashcards table is empty.
/// Returns the number of imported cards.
pub fn import_seed_cards(conn: &mut Connection, path: &Path) -> Result<usize, SeedError> {
    let existing = count_cards(conn)?;
    if existing > 0 {
        tracing::info!("Skipping card seed: table already contains {} cards", existing);
        return Ok(0);
    }

    let drafts: Vec<CardDraft> = read_seed(path)?;
    let now = Utc::now();
    let tx = conn.transaction()?;
    let mut imported = 0;
    for (i, draft) in drafts.into_iter().enumerate() {
        match draft.validated() {
            Ok(draft) => {
                insert_card(&tx, &draft, now)?;
                imported += 1;
            }
            Err(e) => tracing::warn!("Skipping seed card #{}: {}", i + 1, e),
        }
    }
    tx.commit()?;

    tracing::info!("Imported {} cards from {}", imported, path.display());
    Ok(imported)
}

/// Import tips from `path` if the tips table is empty.
pub fn import_seed_tips(conn: &mut Connection, path: &Path) -> Result<usize, SeedError> {
    let existing = count_tips(conn)?;
    if existing > 0 {
        tracing::info!("Skipping tip seed: table already contains {} tips", existing);
        return Ok(0);
    }

    let drafts: Vec<TipDraft> = read_seed(path)?;
    let tx = conn.transaction()?;
    let mut imported = 0;
    for (i, draft) in drafts.into_iter().enumerate() {
        match draft.validated() {
            Ok(draft) => {
                insert_tip(&tx, &draft)?;
                imported += 1;
            }
            Err(e) => tracing::warn!("Skipping seed tip #{}: {}", i + 1, e),
        }
    }
    tx.commit()?;

    tracing::info!("Imported {} tips from {}", imported, path.display());
    Ok(imported)
}
