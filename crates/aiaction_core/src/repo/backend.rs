//! Backend selection and repository wiring.
//!
//! # Responsibility
//! - Build the four repositories for one backend behind trait objects.
//!
//! # Invariants
//! - All SQLite repositories of a set share one [`Database`].
//! - Both backends read time from the same injected [`Clock`].

use crate::clock::Clock;
use crate::db::Database;
use crate::repo::event_repo::{EventRepository, SqliteEventRepository};
use crate::repo::memory::{
    MemoryEventRepository, MemoryNoteRepository, MemoryQuestionRepository, MemoryTimerRepository,
};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::question_repo::{QuestionRepository, SqliteQuestionRepository};
use crate::repo::timer_repo::{SqliteTimerRepository, TimerRepository};
use crate::repo::RepoResult;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

/// Storage variant chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Seeded, process-lifetime storage.
    Memory,
    /// Durable SQLite file, migrated on open.
    Sqlite(PathBuf),
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite(path) => write!(f, "sqlite:{}", path.display()),
        }
    }
}

/// One repository per entity, all backed by the same storage.
#[derive(Clone)]
pub struct Repositories {
    pub events: Arc<dyn EventRepository>,
    pub timer: Arc<dyn TimerRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub questions: Arc<dyn QuestionRepository>,
}

impl Repositories {
    /// Opens the repositories for `backend`.
    pub fn open(backend: &Backend, clock: Arc<dyn Clock>) -> RepoResult<Self> {
        match backend {
            Backend::Memory => Ok(Self::in_memory(clock)),
            Backend::Sqlite(path) => Ok(Self::sqlite(Arc::new(Database::open(path)?), clock)),
        }
    }

    /// Seeded in-memory repositories.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: Arc::new(MemoryEventRepository::seeded()),
            timer: Arc::new(MemoryTimerRepository::new(clock.clone())),
            notes: Arc::new(MemoryNoteRepository::seeded()),
            questions: Arc::new(MemoryQuestionRepository::new(clock)),
        }
    }

    /// SQLite repositories sharing `db`.
    pub fn sqlite(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self {
            events: Arc::new(SqliteEventRepository::new(db.clone())),
            timer: Arc::new(SqliteTimerRepository::new(db.clone(), clock.clone())),
            notes: Arc::new(SqliteNoteRepository::new(db.clone())),
            questions: Arc::new(SqliteQuestionRepository::new(db, clock)),
        }
    }
}
