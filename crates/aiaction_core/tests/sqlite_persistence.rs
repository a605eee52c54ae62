use aiaction_core::{
    Backend, Clock, Database, Event, ManualClock, Note, Question, RepoError, Repositories,
    RequestContext,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 6, 18, 0, 0).unwrap()
}

fn open(path: &Path, clock: &Arc<ManualClock>) -> Repositories {
    let clock: Arc<dyn Clock> = clock.clone();
    Repositories::open(&Backend::Sqlite(path.to_path_buf()), clock).unwrap()
}

#[test]
fn data_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aiaction.db");
    let clock = Arc::new(ManualClock::new(t0()));
    let ctx = RequestContext::background();

    let saved_event;
    {
        let repos = open(&path, &clock);
        saved_event = repos
            .events
            .add_event(
                &ctx,
                Event::new("Persisted", "Speaker", "Body", t0() + Duration::days(1), t0()),
            )
            .unwrap();
        repos.notes.save_note(&ctx, Note::new(2, "Slide two", 5)).unwrap();
        repos
            .questions
            .add_question(&ctx, Question::new("Ada", "Still there?"))
            .unwrap();
        repos
            .timer
            .reset_timer(&ctx, std::time::Duration::from_secs(20 * 60))
            .unwrap();
    }

    let repos = open(&path, &clock);
    assert_eq!(repos.events.get_upcoming_events(&ctx).unwrap(), vec![saved_event]);
    assert_eq!(repos.notes.get_note(&ctx, 2).unwrap().content, "Slide two");
    assert_eq!(repos.questions.get_questions(&ctx).unwrap().len(), 1);
    assert_eq!(
        repos.timer.get_timer(&ctx).unwrap().duration,
        std::time::Duration::from_secs(20 * 60)
    );
}

#[test]
fn running_timer_keeps_counting_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aiaction.db");
    let clock = Arc::new(ManualClock::new(t0()));
    let ctx = RequestContext::background();

    {
        let repos = open(&path, &clock);
        let mut timer = repos.timer.reset_timer(&ctx, std::time::Duration::from_secs(600)).unwrap();
        timer.start(t0());
        repos.timer.update_timer(&ctx, &timer).unwrap();
    }

    clock.advance(std::time::Duration::from_secs(240));
    let repos = open(&path, &clock);
    let timer = repos.timer.get_timer(&ctx).unwrap();
    assert!(timer.is_running);
    assert_eq!(timer.remaining_time, std::time::Duration::from_secs(360));
}

#[test]
fn timer_table_holds_a_single_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aiaction.db");
    let clock = Arc::new(ManualClock::new(t0()));
    let ctx = RequestContext::background();

    let repos = open(&path, &clock);
    for minutes in 1..=5 {
        repos.timer.get_timer(&ctx).unwrap();
        repos
            .timer
            .reset_timer(&ctx, std::time::Duration::from_secs(minutes * 60))
            .unwrap();
    }
    drop(repos);

    let conn = Connection::open(&path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM timers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn lowest_timer_row_is_canonical_when_extras_exist() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    {
        let conn = db.lock().unwrap();
        conn.execute_batch(
            "INSERT INTO timers (duration, remaining_time, is_running, last_started_at)
             VALUES (60000000000, 30000000000, 0, NULL);
             INSERT INTO timers (duration, remaining_time, is_running, last_started_at)
             VALUES (120000000000, 120000000000, 0, NULL);",
        )
        .unwrap();
    }
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(t0()));
    let repos = Repositories::sqlite(db, clock);

    let timer = repos.timer.get_timer(&RequestContext::background()).unwrap();
    assert_eq!(timer.id, 1);
    assert_eq!(timer.remaining_time, std::time::Duration::from_secs(30));
}

#[test]
fn corrupt_timer_row_is_reported_as_invalid_data() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    {
        let conn = db.lock().unwrap();
        conn.execute(
            "INSERT INTO timers (duration, remaining_time, is_running, last_started_at)
             VALUES (10, 20, 0, NULL);",
            [],
        )
        .unwrap();
    }
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(t0()));
    let repos = Repositories::sqlite(db, clock);

    let err = repos.timer.get_timer(&RequestContext::background()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "{err}");
}
