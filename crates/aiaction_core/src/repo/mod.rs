//! Repository contracts and their two storage backends.
//!
//! # Responsibility
//! - Define one capability trait per entity (events, timer, notes, questions).
//! - Provide an ephemeral in-memory backend and a durable SQLite backend with
//!   identical observable behavior.
//!
//! # Invariants
//! - Every operation checks its `RequestContext` before doing any work.
//! - "Not found" is a `bool`/placeholder result wherever the contract defines
//!   one, never an error.
//! - Repositories never log; callers decide how to surface failures.

use crate::context::ContextError;
use crate::db::DbError;
use crate::model::ValidationError;
use chrono::{DateTime, TimeZone, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod backend;
pub mod event_repo;
pub mod memory;
pub mod note_repo;
pub mod question_repo;
pub mod timer_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all entities and both backends.
#[derive(Debug)]
pub enum RepoError {
    /// Caller cancelled or its deadline passed before the call started.
    Context(ContextError),
    /// Record violates a domain invariant; nothing was written.
    Validation(ValidationError),
    Db(DbError),
    /// Persisted row cannot be mapped back to a valid domain record.
    InvalidData(String),
    /// In-memory collection lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
}

impl RepoError {
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Context(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::LockPoisoned(collection) => write!(f, "{collection} store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Context(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::LockPoisoned(_) => None,
        }
    }
}

impl From<ContextError> for RepoError {
    fn from(value: ContextError) -> Self {
        Self::Context(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

// Column codecs shared by the SQLite repositories.

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn parse_bool(column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

/// Durations are stored as signed nanosecond counts.
pub(crate) fn duration_to_db(value: Duration) -> RepoResult<i64> {
    i64::try_from(value.as_nanos())
        .map_err(|_| RepoError::Validation(ValidationError::DurationOutOfRange(value)))
}

pub(crate) fn duration_from_db(column: &str, value: i64) -> RepoResult<Duration> {
    u64::try_from(value)
        .map(Duration::from_nanos)
        .map_err(|_| RepoError::InvalidData(format!("negative duration `{value}` in {column}")))
}

/// Domain timestamps are stored as Unix nanoseconds so timer math survives a
/// round trip without truncation.
pub(crate) fn datetime_to_db(column: &str, value: DateTime<Utc>) -> RepoResult<i64> {
    value.timestamp_nanos_opt().ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp {value} out of range for {column}"))
    })
}

pub(crate) fn datetime_from_db(value: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(value)
}

pub(crate) fn page_from_db(column: &str, value: i64) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid page value `{value}` in {column}")))
}
