//! In-memory repository backend.
//!
//! # Responsibility
//! - Satisfy the same contracts as the SQLite backend for the lifetime of
//!   the process, with no persistence.
//! - Provide seeded stores for demos and local development.
//!
//! # Invariants
//! - One `RwLock` per collection; readers share, writers are exclusive.
//! - Only in-memory work happens under a lock.
//! - Values are cloned out; no reference into a store escapes a call.

use crate::clock::Clock;
use crate::context::RequestContext;
use crate::model::event::Event;
use crate::model::note::Note;
use crate::model::question::{newest_first, Question};
use crate::model::timer::{reconcile, Timer};
use crate::model::RecordId;
use crate::repo::event_repo::EventRepository;
use crate::repo::note_repo::NoteRepository;
use crate::repo::question_repo::QuestionRepository;
use crate::repo::timer_repo::TimerRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

const SEED_TOTAL_PAGES: u32 = 10;

fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    collection: &'static str,
) -> RepoResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| RepoError::LockPoisoned(collection))
}

fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    collection: &'static str,
) -> RepoResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| RepoError::LockPoisoned(collection))
}

#[derive(Debug)]
struct Sequenced<T> {
    items: T,
    next_id: RecordId,
}

impl<T: Default> Default for Sequenced<T> {
    fn default() -> Self {
        Self {
            items: T::default(),
            next_id: 1,
        }
    }
}

impl<T> Sequenced<T> {
    fn allocate_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Process-lifetime event store.
#[derive(Debug, Default)]
pub struct MemoryEventRepository {
    events: RwLock<Sequenced<Vec<Event>>>,
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with two upcoming and two past talks.
    pub fn seeded() -> Self {
        let repo = Self::new();
        if let Ok(mut store) = repo.events.write() {
            for event in sample_events() {
                let id = store.allocate_id();
                store.items.push(Event { id, ..event });
            }
        }
        repo
    }

    fn list(&self, ctx: &RequestContext, upcoming: bool) -> RepoResult<Vec<Event>> {
        ctx.check()?;
        let store = read_lock(&self.events, "events")?;
        Ok(store
            .items
            .iter()
            .filter(|event| event.is_upcoming == upcoming)
            .cloned()
            .collect())
    }
}

impl EventRepository for MemoryEventRepository {
    fn get_upcoming_events(&self, ctx: &RequestContext) -> RepoResult<Vec<Event>> {
        self.list(ctx, true)
    }

    fn get_past_events(&self, ctx: &RequestContext) -> RepoResult<Vec<Event>> {
        self.list(ctx, false)
    }

    fn add_event(&self, ctx: &RequestContext, mut event: Event) -> RepoResult<Event> {
        ctx.check()?;
        event.validate()?;
        let mut store = write_lock(&self.events, "events")?;
        event.id = store.allocate_id();
        store.items.push(event.clone());
        Ok(event)
    }

    fn update_event(&self, ctx: &RequestContext, event: &Event) -> RepoResult<bool> {
        ctx.check()?;
        event.validate()?;
        let mut store = write_lock(&self.events, "events")?;
        match store.items.iter_mut().find(|stored| stored.id == event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Process-lifetime singleton timer.
pub struct MemoryTimerRepository {
    timer: RwLock<Timer>,
    clock: Arc<dyn Clock>,
}

impl MemoryTimerRepository {
    /// Stopped timer with the default 15 minute countdown.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            timer: RwLock::new(Timer { id: 1, ..Timer::default() }),
            clock,
        }
    }
}

impl TimerRepository for MemoryTimerRepository {
    fn get_timer(&self, ctx: &RequestContext) -> RepoResult<Timer> {
        ctx.check()?;
        {
            let timer = read_lock(&self.timer, "timer")?;
            if !timer.is_running {
                return Ok(timer.clone());
            }
        }

        // Running: settle and store under the write lock so concurrent reads
        // never charge the same interval twice.
        let mut timer = write_lock(&self.timer, "timer")?;
        *timer = reconcile(&timer, self.clock.now());
        Ok(timer.clone())
    }

    fn update_timer(&self, ctx: &RequestContext, timer: &Timer) -> RepoResult<Timer> {
        ctx.check()?;
        timer.validate()?;
        let mut stored = write_lock(&self.timer, "timer")?;
        *stored = Timer {
            id: stored.id,
            ..timer.clone()
        };
        Ok(stored.clone())
    }

    fn reset_timer(&self, ctx: &RequestContext, duration: Duration) -> RepoResult<Timer> {
        ctx.check()?;
        Timer::with_duration(duration).validate()?;
        let mut stored = write_lock(&self.timer, "timer")?;
        stored.reset(duration);
        Ok(stored.clone())
    }
}

/// Process-lifetime note store keyed by page number.
#[derive(Debug, Default)]
pub struct MemoryNoteRepository {
    notes: RwLock<Sequenced<BTreeMap<u32, Note>>>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the first two pages of a ten page deck filled in.
    pub fn seeded() -> Self {
        let repo = Self::new();
        if let Ok(mut store) = repo.notes.write() {
            for (page, content) in [
                (1, "Introduction to the talk"),
                (2, "Key concepts and definitions"),
            ] {
                let id = store.allocate_id();
                let note = Note {
                    id,
                    ..Note::new(page, content, SEED_TOTAL_PAGES)
                };
                store.items.insert(page, note);
            }
        }
        repo
    }
}

impl NoteRepository for MemoryNoteRepository {
    fn get_note(&self, ctx: &RequestContext, page_number: u32) -> RepoResult<Note> {
        ctx.check()?;
        let store = read_lock(&self.notes, "notes")?;
        if let Some(note) = store.items.get(&page_number) {
            return Ok(note.clone());
        }
        let stored = u32::try_from(store.items.len()).unwrap_or(u32::MAX);
        Ok(Note::placeholder(page_number, stored))
    }

    fn save_note(&self, ctx: &RequestContext, mut note: Note) -> RepoResult<Note> {
        ctx.check()?;
        note.validate()?;
        let mut store = write_lock(&self.notes, "notes")?;
        note.id = match store.items.get(&note.page_number) {
            Some(existing) => existing.id,
            None => store.allocate_id(),
        };
        store.items.insert(note.page_number, note.clone());
        Ok(note)
    }
}

/// Process-lifetime question queue.
pub struct MemoryQuestionRepository {
    questions: RwLock<Sequenced<Vec<Question>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryQuestionRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            questions: RwLock::new(Sequenced::default()),
            clock,
        }
    }
}

impl QuestionRepository for MemoryQuestionRepository {
    fn get_questions(&self, ctx: &RequestContext) -> RepoResult<Vec<Question>> {
        ctx.check()?;
        let mut questions = read_lock(&self.questions, "questions")?.items.clone();
        questions.sort_by(newest_first);
        Ok(questions)
    }

    fn add_question(&self, ctx: &RequestContext, mut question: Question) -> RepoResult<Question> {
        ctx.check()?;
        question.validate()?;
        let mut store = write_lock(&self.questions, "questions")?;
        question.id = store.allocate_id();
        question.submitted_at = self.clock.now();
        question.answered = false;
        store.items.push(question.clone());
        Ok(question)
    }

    fn mark_as_answered(&self, ctx: &RequestContext, id: RecordId) -> RepoResult<bool> {
        ctx.check()?;
        let mut store = write_lock(&self.questions, "questions")?;
        match store.items.iter_mut().find(|question| question.id == id) {
            Some(question) => {
                question.answered = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn sample_events() -> Vec<Event> {
    vec![
        sample_event(
            "Generative AI for Scientific Discovery",
            "Dr. Alex Chen",
            "Exploring how generative AI models can accelerate scientific discovery in various domains.",
            (2025, 3, 6),
            true,
        ),
        sample_event(
            "Ethical Considerations in AI Development",
            "Prof. Maya Johnson",
            "Discussing the ethical frameworks necessary for responsible AI development.",
            (2025, 3, 13),
            true,
        ),
        sample_event(
            "Multimodal Learning in AI",
            "Sam Rodriguez",
            "How combining different data modalities can enhance AI model capabilities.",
            (2025, 2, 20),
            false,
        ),
        sample_event(
            "Reinforcement Learning from Human Feedback",
            "Dr. Jamie Park",
            "Deep dive into how RLHF is transforming the alignment of AI systems.",
            (2025, 2, 13),
            false,
        ),
    ]
}

fn sample_event(
    title: &str,
    speaker: &str,
    description: &str,
    (year, month, day): (i32, u32, u32),
    is_upcoming: bool,
) -> Event {
    Event {
        id: 0,
        title: title.to_string(),
        speaker: speaker.to_string(),
        description: description.to_string(),
        date: session_start(year, month, day),
        is_upcoming,
    }
}

/// Meetups start at 18:00 UTC.
fn session_start(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 18, 0, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{MemoryEventRepository, MemoryNoteRepository};
    use crate::context::RequestContext;
    use crate::repo::event_repo::EventRepository;
    use crate::repo::note_repo::NoteRepository;

    #[test]
    fn seeded_events_split_two_and_two() {
        let repo = MemoryEventRepository::seeded();
        let ctx = RequestContext::background();
        let upcoming = repo.get_upcoming_events(&ctx).unwrap();
        let past = repo.get_past_events(&ctx).unwrap();
        assert_eq!(upcoming.len(), 2);
        assert_eq!(past.len(), 2);
        assert_eq!(upcoming[0].id, 1);
        assert_eq!(past[1].id, 4);
    }

    #[test]
    fn seeded_notes_cover_first_two_pages() {
        let repo = MemoryNoteRepository::seeded();
        let ctx = RequestContext::background();
        let first = repo.get_note(&ctx, 1).unwrap();
        assert_eq!(first.content, "Introduction to the talk");
        assert_eq!(first.total_pages, 10);

        let blank = repo.get_note(&ctx, 3).unwrap();
        assert!(blank.is_placeholder());
        assert_eq!(blank.total_pages, 2);
    }
}
