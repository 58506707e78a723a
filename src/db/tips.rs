//! Study tip CRUD

use chrono::Utc;
use rusqlite::{params, Connection, Result};

use super::cards::{format_timestamp, tags_from_json, tags_to_json};
use crate::domain::{Tip, TipDraft, TipId};

pub fn insert_tip(conn: &Connection, draft: &TipDraft) -> Result<Tip> {
    conn.execute(
        "INSERT INTO tips (title, content, category, tags, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.title,
            draft.content,
            draft.category,
            tags_to_json(&draft.tags)?,
            format_timestamp(Utc::now()),
        ],
    )?;

    Ok(Tip {
        id: conn.last_insert_rowid(),
        title: draft.title.clone(),
        content: draft.content.clone(),
        category: draft.category.clone(),
        tags: draft.tags.clone(),
    })
}

pub fn list_tips(conn: &Connection) -> Result<Vec<Tip>> {
    let mut stmt =
        conn.prepare("SELECT id, title, content, category, tags FROM tips ORDER BY id ASC")?;
    let tips = stmt
        .query_map([], |row| row_to_tip(row))?
        .collect::<Result<Vec<_>>>()?;
    Ok(tips)
}

pub fn get_tip_by_id(conn: &Connection, id: TipId) -> Result<Option<Tip>> {
    let mut stmt =
        conn.prepare("SELECT id, title, content, category, tags FROM tips WHERE id = ?1")?;
    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_tip(row)?))
    } else {
        Ok(None)
    }
}

pub fn count_tips(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM tips", [], |row| row.get(0))
}

pub fn update_tip(conn: &Connection, tip: &Tip) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE tips SET title = ?1, content = ?2, category = ?3, tags = ?4 WHERE id = ?5",
        params![tip.title, tip.content, tip.category, tags_to_json(&tip.tags)?, tip.id],
    )?;
    Ok(changed > 0)
}

pub fn delete_tip(conn: &Connection, id: TipId) -> Result<bool> {
    let changed = conn.execute("DELETE FROM tips WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

fn row_to_tip(row: &rusqlite::Row) -> Result<Tip> {
    let tags_json: String = row.get(4)?;
    Ok(Tip {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        tags: tags_from_json(4, &tags_json)?,
    })
}
