//! Event repository contract and SQLite implementation.
//!
//! # Invariants
//! - Upcoming/past listings partition by the stored `is_upcoming` flag and
//!   keep storage (id) order.
//! - Write paths call `Event::validate()` before SQL mutations.

use crate::context::RequestContext;
use crate::db::Database;
use crate::model::event::Event;
use crate::repo::{bool_to_int, datetime_from_db, datetime_to_db, parse_bool, RepoResult};
use rusqlite::{params, Connection, Row};
use std::sync::Arc;

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    speaker,
    description,
    date,
    is_upcoming
FROM events";

/// Repository interface for events.
pub trait EventRepository: Send + Sync {
    fn get_upcoming_events(&self, ctx: &RequestContext) -> RepoResult<Vec<Event>>;
    fn get_past_events(&self, ctx: &RequestContext) -> RepoResult<Vec<Event>>;
    /// Stores a new event under a fresh id and returns the stored value.
    fn add_event(&self, ctx: &RequestContext, event: Event) -> RepoResult<Event>;
    /// Replaces the event with the same id. Returns `false` if none exists.
    fn update_event(&self, ctx: &RequestContext, event: &Event) -> RepoResult<bool>;
}

impl<T: EventRepository + ?Sized> EventRepository for Arc<T> {
    fn get_upcoming_events(&self, ctx: &RequestContext) -> RepoResult<Vec<Event>> {
        (**self).get_upcoming_events(ctx)
    }

    fn get_past_events(&self, ctx: &RequestContext) -> RepoResult<Vec<Event>> {
        (**self).get_past_events(ctx)
    }

    fn add_event(&self, ctx: &RequestContext, event: Event) -> RepoResult<Event> {
        (**self).add_event(ctx, event)
    }

    fn update_event(&self, ctx: &RequestContext, event: &Event) -> RepoResult<bool> {
        (**self).update_event(ctx, event)
    }
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository {
    db: Arc<Database>,
}

impl SqliteEventRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl EventRepository for SqliteEventRepository {
    fn get_upcoming_events(&self, ctx: &RequestContext) -> RepoResult<Vec<Event>> {
        ctx.check()?;
        let conn = self.db.lock()?;
        list_events(&conn, true)
    }

    fn get_past_events(&self, ctx: &RequestContext) -> RepoResult<Vec<Event>> {
        ctx.check()?;
        let conn = self.db.lock()?;
        list_events(&conn, false)
    }

    fn add_event(&self, ctx: &RequestContext, mut event: Event) -> RepoResult<Event> {
        ctx.check()?;
        event.validate()?;
        let date = datetime_to_db("events.date", event.date)?;

        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO events (
                title,
                speaker,
                description,
                date,
                is_upcoming
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                event.title.as_str(),
                event.speaker.as_str(),
                event.description.as_str(),
                date,
                bool_to_int(event.is_upcoming),
            ],
        )?;

        event.id = conn.last_insert_rowid();
        Ok(event)
    }

    fn update_event(&self, ctx: &RequestContext, event: &Event) -> RepoResult<bool> {
        ctx.check()?;
        event.validate()?;
        let date = datetime_to_db("events.date", event.date)?;

        let conn = self.db.lock()?;
        let changed = conn.execute(
            "UPDATE events
             SET
                title = ?1,
                speaker = ?2,
                description = ?3,
                date = ?4,
                is_upcoming = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                event.title.as_str(),
                event.speaker.as_str(),
                event.description.as_str(),
                date,
                bool_to_int(event.is_upcoming),
                event.id,
            ],
        )?;

        Ok(changed > 0)
    }
}

fn list_events(conn: &Connection, upcoming: bool) -> RepoResult<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "{EVENT_SELECT_SQL}
         WHERE is_upcoming = ?1
         ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([bool_to_int(upcoming)])?;
    let mut events = Vec::new();
    while let Some(row) = rows.next()? {
        events.push(parse_event_row(row)?);
    }
    Ok(events)
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let event = Event {
        id: row.get("id")?,
        title: row.get("title")?,
        speaker: row.get("speaker")?,
        description: row.get("description")?,
        date: datetime_from_db(row.get("date")?),
        is_upcoming: parse_bool("events.is_upcoming", row.get("is_upcoming")?)?,
    };
    Ok(event)
}
