//! Core domain logic for the AI Action meetup app.
//! This crate is the single source of truth for event, timer, note and
//! question invariants.

pub mod clock;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ContextError, RequestContext};
pub use db::{Database, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::Event;
pub use model::note::Note;
pub use model::question::Question;
pub use model::timer::{reconcile, Timer, DEFAULT_TIMER_DURATION};
pub use model::{RecordId, ValidationError};
pub use repo::backend::{Backend, Repositories};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::memory::{
    MemoryEventRepository, MemoryNoteRepository, MemoryQuestionRepository, MemoryTimerRepository,
};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::question_repo::{QuestionRepository, SqliteQuestionRepository};
pub use repo::timer_repo::{SqliteTimerRepository, TimerRepository};
pub use repo::{RepoError, RepoResult};
pub use service::event_service::{EventService, NewEvent, Timeline, UpcomingPolicy};
pub use service::note_service::{NotePage, NoteService};
pub use service::question_service::{QuestionQueue, QuestionService};
pub use service::timer_service::{format_clock, TimerService};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
