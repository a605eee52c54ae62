//! Note repository contract and SQLite implementation.
//!
//! # Invariants
//! - `page_number` is the lookup key; the row id is storage detail.
//! - Missing pages yield `Note::placeholder` carrying the requested page and
//!   the number of stored notes as `total_pages`.
//! - `save_note` is an upsert by page and runs in one transaction.

use crate::context::RequestContext;
use crate::db::Database;
use crate::model::note::Note;
use crate::repo::{page_from_db, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::Arc;

/// Repository interface for speaker notes.
pub trait NoteRepository: Send + Sync {
    /// Returns the note stored for `page_number`, or a blank placeholder.
    fn get_note(&self, ctx: &RequestContext, page_number: u32) -> RepoResult<Note>;
    /// Inserts or replaces the note for `note.page_number`.
    fn save_note(&self, ctx: &RequestContext, note: Note) -> RepoResult<Note>;
}

impl<T: NoteRepository + ?Sized> NoteRepository for Arc<T> {
    fn get_note(&self, ctx: &RequestContext, page_number: u32) -> RepoResult<Note> {
        (**self).get_note(ctx, page_number)
    }

    fn save_note(&self, ctx: &RequestContext, note: Note) -> RepoResult<Note> {
        (**self).save_note(ctx, note)
    }
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository {
    db: Arc<Database>,
}

impl SqliteNoteRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn get_note(&self, ctx: &RequestContext, page_number: u32) -> RepoResult<Note> {
        ctx.check()?;
        let conn = self.db.lock()?;

        if let Some(note) = find_note_by_page(&conn, page_number)? {
            return Ok(note);
        }

        let stored: i64 = conn.query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        Ok(Note::placeholder(
            page_number,
            page_from_db("COUNT(notes)", stored)?,
        ))
    }

    fn save_note(&self, ctx: &RequestContext, mut note: Note) -> RepoResult<Note> {
        ctx.check()?;
        note.validate()?;

        let mut conn = self.db.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        match find_note_by_page(&tx, note.page_number)? {
            Some(existing) => {
                tx.execute(
                    "UPDATE notes
                     SET
                        content = ?1,
                        total_pages = ?2,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?3;",
                    params![note.content.as_str(), note.total_pages, existing.id],
                )?;
                note.id = existing.id;
            }
            None => {
                tx.execute(
                    "INSERT INTO notes (content, page_number, total_pages)
                     VALUES (?1, ?2, ?3);",
                    params![note.content.as_str(), note.page_number, note.total_pages],
                )?;
                note.id = tx.last_insert_rowid();
            }
        }

        tx.commit()?;
        Ok(note)
    }
}

fn find_note_by_page(conn: &Connection, page_number: u32) -> RepoResult<Option<Note>> {
    let found = conn
        .query_row(
            "SELECT
                id,
                content,
                page_number,
                total_pages
             FROM notes
             WHERE page_number = ?1
             ORDER BY id ASC
             LIMIT 1;",
            [page_number],
            |row| Ok(parse_note_row(row)),
        )
        .optional()?;
    found.transpose()
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        content: row.get("content")?,
        page_number: page_from_db("notes.page_number", row.get("page_number")?)?,
        total_pages: page_from_db("notes.total_pages", row.get("total_pages")?)?,
    })
}
