//! Audience question queue entries.
//!
//! # Invariants
//! - `submitted_at` and `id` are owned by the repository; values supplied by
//!   callers are overwritten on insert.
//! - `answered` only ever moves from `false` to `true`.

use super::{require_text, RecordId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: RecordId,
    pub name: String,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
    pub answered: bool,
}

impl Question {
    /// Unsaved question. `submitted_at` stays at the epoch until inserted.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            content: content.into(),
            submitted_at: DateTime::<Utc>::default(),
            answered: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("question", "content", &self.content)
    }
}

/// Queue order: newest submission first, later ids first on ties.
pub fn newest_first(a: &Question, b: &Question) -> Ordering {
    b.submitted_at
        .cmp(&a.submitted_at)
        .then_with(|| b.id.cmp(&a.id))
}
