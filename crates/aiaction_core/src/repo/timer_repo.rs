//! Singleton timer repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose the one speaker timer of a store.
//! - Apply [`reconcile`] on every read and persist the settled state.
//!
//! # Invariants
//! - The SQLite backend only addresses the timer row through
//!   `load_or_create_timer`: the lowest id, created with the default duration
//!   when the table is empty.
//! - Read-reconcile-write runs inside one `IMMEDIATE` transaction, so a
//!   concurrent reset or update cannot land between the read and the save.

use crate::clock::Clock;
use crate::context::RequestContext;
use crate::db::Database;
use crate::model::timer::{reconcile, Timer, DEFAULT_TIMER_DURATION};
use crate::repo::{
    bool_to_int, datetime_from_db, datetime_to_db, duration_from_db, duration_to_db, parse_bool,
    RepoError, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::sync::Arc;
use std::time::Duration;

/// Repository interface for the singleton speaker timer.
pub trait TimerRepository: Send + Sync {
    /// Returns the timer settled against the current time.
    fn get_timer(&self, ctx: &RequestContext) -> RepoResult<Timer>;
    /// Overwrites the full timer state. The caller's `id` is ignored; the
    /// returned value carries the canonical one.
    fn update_timer(&self, ctx: &RequestContext, timer: &Timer) -> RepoResult<Timer>;
    /// Sets `duration` and `remaining_time` to `duration` and stops the timer.
    fn reset_timer(&self, ctx: &RequestContext, duration: Duration) -> RepoResult<Timer>;
}

impl<T: TimerRepository + ?Sized> TimerRepository for Arc<T> {
    fn get_timer(&self, ctx: &RequestContext) -> RepoResult<Timer> {
        (**self).get_timer(ctx)
    }

    fn update_timer(&self, ctx: &RequestContext, timer: &Timer) -> RepoResult<Timer> {
        (**self).update_timer(ctx, timer)
    }

    fn reset_timer(&self, ctx: &RequestContext, duration: Duration) -> RepoResult<Timer> {
        (**self).reset_timer(ctx, duration)
    }
}

/// SQLite-backed timer repository.
pub struct SqliteTimerRepository {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl SqliteTimerRepository {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    fn with_timer<F>(&self, ctx: &RequestContext, apply: F) -> RepoResult<Timer>
    where
        F: FnOnce(&Timer, DateTime<Utc>) -> RepoResult<Timer>,
    {
        ctx.check()?;
        let mut conn = self.db.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stored = load_or_create_timer(&tx)?;
        // Read the clock under the lock so no other writer can be "ahead" of us.
        let mut next = apply(&stored, self.clock.now())?;
        next.id = stored.id;
        if next != stored {
            write_timer(&tx, &next)?;
        }

        tx.commit()?;
        Ok(next)
    }
}

impl TimerRepository for SqliteTimerRepository {
    fn get_timer(&self, ctx: &RequestContext) -> RepoResult<Timer> {
        self.with_timer(ctx, |stored, now| Ok(reconcile(stored, now)))
    }

    fn update_timer(&self, ctx: &RequestContext, timer: &Timer) -> RepoResult<Timer> {
        timer.validate()?;
        self.with_timer(ctx, |_, _| Ok(timer.clone()))
    }

    fn reset_timer(&self, ctx: &RequestContext, duration: Duration) -> RepoResult<Timer> {
        Timer::with_duration(duration).validate()?;
        self.with_timer(ctx, |stored, _| {
            let mut next = stored.clone();
            next.reset(duration);
            Ok(next)
        })
    }
}

fn load_or_create_timer(tx: &Transaction<'_>) -> RepoResult<Timer> {
    let existing = tx
        .query_row(
            "SELECT
                id,
                duration,
                remaining_time,
                is_running,
                last_started_at
             FROM timers
             ORDER BY id ASC
             LIMIT 1;",
            [],
            |row| Ok(parse_timer_row(row)),
        )
        .optional()?;

    if let Some(timer) = existing {
        return timer;
    }

    let mut timer = Timer::with_duration(DEFAULT_TIMER_DURATION);
    tx.execute(
        "INSERT INTO timers (duration, remaining_time, is_running, last_started_at)
         VALUES (?1, ?2, 0, NULL);",
        params![
            duration_to_db(timer.duration)?,
            duration_to_db(timer.remaining_time)?,
        ],
    )?;
    timer.id = tx.last_insert_rowid();
    Ok(timer)
}

fn write_timer(tx: &Transaction<'_>, timer: &Timer) -> RepoResult<()> {
    let last_started_at = timer
        .last_started_at
        .map(|value| datetime_to_db("timers.last_started_at", value))
        .transpose()?;

    tx.execute(
        "UPDATE timers
         SET
            duration = ?1,
            remaining_time = ?2,
            is_running = ?3,
            last_started_at = ?4,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?5;",
        params![
            duration_to_db(timer.duration)?,
            duration_to_db(timer.remaining_time)?,
            bool_to_int(timer.is_running),
            last_started_at,
            timer.id,
        ],
    )?;
    Ok(())
}

fn parse_timer_row(row: &Row<'_>) -> RepoResult<Timer> {
    let timer = Timer {
        id: row.get("id")?,
        duration: duration_from_db("timers.duration", row.get("duration")?)?,
        remaining_time: duration_from_db("timers.remaining_time", row.get("remaining_time")?)?,
        is_running: parse_bool("timers.is_running", row.get("is_running")?)?,
        last_started_at: row
            .get::<_, Option<i64>>("last_started_at")?
            .map(datetime_from_db),
    };
    timer
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("timers row {}: {err}", timer.id)))?;
    Ok(timer)
}
