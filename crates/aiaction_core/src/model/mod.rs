//! Domain model for events, the speaker timer, notes and questions.
//!
//! # Responsibility
//! - Define the value records exchanged across the repository boundary.
//! - Own the invariants shared by every storage backend.
//!
//! # Invariants
//! - Records are plain values; repositories never hand out references into
//!   their storage.
//! - An id of `0` means "not stored yet"; stored ids are always positive.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod event;
pub mod note;
pub mod question;
pub mod timer;

/// Surrogate row id shared by all entities.
pub type RecordId = i64;

/// Invariant violation detected on a domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
    /// Timer remaining time exceeds its configured duration.
    RemainingExceedsDuration {
        remaining: Duration,
        duration: Duration,
    },
    /// Timer is flagged running but has no start timestamp.
    RunningWithoutStart,
    /// Duration too large to be stored as signed nanoseconds.
    DurationOutOfRange(Duration),
    /// Timestamp outside the signed-nanosecond range (1677-09-21 to 2262-04-11).
    TimestampOutOfRange {
        entity: &'static str,
        field: &'static str,
        value: DateTime<Utc>,
    },
    /// Note pages are numbered from 1.
    InvalidPageNumber(u32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => write!(f, "{entity}.{field} must not be blank"),
            Self::RemainingExceedsDuration {
                remaining,
                duration,
            } => write!(
                f,
                "timer remaining time {remaining:?} exceeds duration {duration:?}"
            ),
            Self::RunningWithoutStart => write!(f, "running timer has no last_started_at"),
            Self::DurationOutOfRange(value) => {
                write!(f, "duration {value:?} cannot be stored as nanoseconds")
            }
            Self::TimestampOutOfRange {
                entity,
                field,
                value,
            } => write!(
                f,
                "{entity}.{field} {value} is outside the supported range 1677-09-21..2262-04-11"
            ),
            Self::InvalidPageNumber(page) => write!(f, "invalid page number {page}; pages start at 1"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_storable_duration(value: Duration) -> Result<(), ValidationError> {
    if i64::try_from(value.as_nanos()).is_err() {
        return Err(ValidationError::DurationOutOfRange(value));
    }
    Ok(())
}

pub(crate) fn require_storable_timestamp(
    entity: &'static str,
    field: &'static str,
    value: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if value.timestamp_nanos_opt().is_none() {
        return Err(ValidationError::TimestampOutOfRange {
            entity,
            field,
            value,
        });
    }
    Ok(())
}
