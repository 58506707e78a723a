//! Flashcard CRUD and candidate queries

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result};

use crate::domain::{CardDraft, CardId, Flashcard};

pub fn insert_card(conn: &Connection, draft: &CardDraft, created_at: DateTime<Utc>) -> Result<Flashcard> {
    conn.execute(
        r#"
    INSERT INTO flashcards (question, answer, example, example_translation, tags, notes, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        params![
            draft.question,
            draft.answer,
            draft.example,
            draft.example_translation,
            tags_to_json(&draft.tags)?,
            draft.notes,
            format_timestamp(created_at),
        ],
    )?;

    Ok(Flashcard {
        id: conn.last_insert_rowid(),
        question: draft.question.clone(),
        answer: draft.answer.clone(),
        example: draft.example.clone(),
        example_translation: draft.example_translation.clone(),
        tags: draft.tags.clone(),
        notes: draft.notes.clone(),
        last_seen: None,
        created_at,
    })
}

/// All cards, ordered by id ascending
pub fn list_cards(conn: &Connection) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, question, answer, example, example_translation, tags, notes, last_seen, created_at
    FROM flashcards
    ORDER BY id ASC
    "#,
    )?;

    let cards = stmt
        .query_map([], |row| row_to_card(row))?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

pub fn get_card_by_id(conn: &Connection, id: CardId) -> Result<Option<Flashcard>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, question, answer, example, example_translation, tags, notes, last_seen, created_at
    FROM flashcards WHERE id = ?1
    "#,
    )?;

    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_card(row)?))
    } else {
        Ok(None)
    }
}

pub fn count_cards(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM flashcards", [], |row| row.get(0))
}

/// Write every editable field of `card`. Returns false if no row has its id.
pub fn update_card(conn: &Connection, card: &Flashcard) -> Result<bool> {
    let changed = conn.execute(
        r#"
    UPDATE flashcards
    SET question = ?1, answer = ?2, example = ?3, example_translation = ?4, tags = ?5, notes = ?6
    WHERE id = ?7
    "#,
        params![
            card.question,
            card.answer,
            card.example,
            card.example_translation,
            tags_to_json(&card.tags)?,
            card.notes,
            card.id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_card(conn: &Connection, id: CardId) -> Result<bool> {
    let changed = conn.execute("DELETE FROM flashcards WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

pub fn touch_last_seen(conn: &Connection, id: CardId, at: DateTime<Utc>) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE flashcards SET last_seen = ?1 WHERE id = ?2",
        params![format_timestamp(at), id],
    )?;
    Ok(changed > 0)
}

/// Candidate pool for a draw: never-seen cards first, then the ones seen
/// longest ago. An empty `tags` slice means no filter; otherwise a card
/// matches if it carries any of the tags.
pub fn get_weighted_candidates(conn: &Connection, tags: &[String], limit: usize) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, question, answer, example, example_translation, tags, notes, last_seen, created_at
    FROM flashcards f
    WHERE ?1 = 0
       OR EXISTS (
         SELECT 1 FROM json_each(f.tags) t
         WHERE t.value IN (SELECT value FROM json_each(?2))
       )
    ORDER BY last_seen IS NOT NULL, last_seen ASC, id ASC
    LIMIT ?3
    "#,
    )?;

    let cards = stmt
        .query_map(
            params![tags.len() as i64, tags_to_json(tags)?, limit as i64],
            |row| row_to_card(row),
        )?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

pub(crate) fn tags_to_json(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn tags_from_json(idx: usize, raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering
pub(crate) fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_card(row: &rusqlite::Row) -> Result<Flashcard> {
    let tags_json: String = row.get(5)?;
    let last_seen: Option<String> = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(Flashcard {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        example: row.get(3)?,
        example_translation: row.get(4)?,
        tags: tags_from_json(5, &tags_json)?,
        notes: row.get(6)?,
        last_seen: last_seen.map(|raw| parse_timestamp(7, &raw)).transpose()?,
        created_at: parse_timestamp(8, &created_at)?,
    })
}
