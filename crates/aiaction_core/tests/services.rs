use aiaction_core::{
    Clock, EventService, ManualClock, MemoryEventRepository, MemoryNoteRepository,
    MemoryQuestionRepository, MemoryTimerRepository, NewEvent, NoteService, QuestionService,
    RequestContext, ServiceError, TimerService, UpcomingPolicy,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn new_event(title: &str, date: DateTime<Utc>) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        speaker: "  Dr. Alex Chen ".to_string(),
        description: "Talk".to_string(),
        date,
    }
}

#[test]
fn add_event_trims_input_and_stamps_flag() {
    let clock = Arc::new(ManualClock::new(t0()));
    let service = EventService::new(
        MemoryEventRepository::new(),
        clock.clone(),
        UpcomingPolicy::Stored,
    );
    let ctx = RequestContext::background();

    let event = service
        .add_event(&ctx, new_event("  Keynote ", t0() + Duration::days(1)))
        .unwrap();
    assert_eq!(event.title, "Keynote");
    assert_eq!(event.speaker, "Dr. Alex Chen");
    assert!(event.is_upcoming);

    let err = service
        .add_event(&ctx, new_event("   ", t0() + Duration::days(1)))
        .unwrap_err();
    assert!(err.is_client_error());
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[test]
fn timeline_policy_controls_stale_flags() {
    let clock = Arc::new(ManualClock::new(t0()));
    let repo = Arc::new(MemoryEventRepository::new());
    let ctx = RequestContext::background();

    let stored = EventService::new(repo.clone(), clock.clone(), UpcomingPolicy::Stored);
    let recompute = EventService::new(repo.clone(), clock.clone(), UpcomingPolicy::Recompute);

    stored
        .add_event(&ctx, new_event("Tonight", t0() + Duration::hours(6)))
        .unwrap();
    stored
        .add_event(&ctx, new_event("Next week", t0() + Duration::days(7)))
        .unwrap();
    clock.set(t0() + Duration::days(1));

    let as_stored = stored.timeline(&ctx).unwrap();
    assert_eq!(as_stored.upcoming.len(), 2);
    assert!(as_stored.past.is_empty());

    let live = recompute.timeline(&ctx).unwrap();
    assert_eq!(live.upcoming.len(), 1);
    assert_eq!(live.upcoming[0].title, "Next week");
    assert_eq!(live.past.len(), 1);
    assert!(!live.past[0].is_upcoming);
}

#[test]
fn update_event_restamps_and_reports_missing() {
    let clock = Arc::new(ManualClock::new(t0()));
    let service = EventService::new(
        MemoryEventRepository::new(),
        clock.clone(),
        UpcomingPolicy::Stored,
    );
    let ctx = RequestContext::background();

    let event = service
        .add_event(&ctx, new_event("Moved", t0() + Duration::days(2)))
        .unwrap();
    assert!(service
        .update_event(&ctx, event.id, new_event("Moved", t0() - Duration::days(2)))
        .unwrap());
    let timeline = service.timeline(&ctx).unwrap();
    assert!(timeline.upcoming.is_empty());
    assert_eq!(timeline.past[0].id, event.id);

    assert!(!service
        .update_event(&ctx, 404, new_event("Ghost", t0()))
        .unwrap());
}

#[test]
fn timer_reset_validates_minutes() {
    let clock = Arc::new(ManualClock::new(t0()));
    let shared: Arc<dyn Clock> = clock.clone();
    let service = TimerService::new(MemoryTimerRepository::new(shared.clone()), shared);
    let ctx = RequestContext::background();

    assert!(service.reset(&ctx, 0).unwrap_err().is_client_error());
    assert!(service.reset(&ctx, 241).unwrap_err().is_client_error());
    let timer = service.reset(&ctx, 240).unwrap();
    assert_eq!(timer.duration, std::time::Duration::from_secs(240 * 60));
}

#[test]
fn start_and_pause_are_idempotent() {
    let clock = Arc::new(ManualClock::new(t0()));
    let shared: Arc<dyn Clock> = clock.clone();
    let service = TimerService::new(MemoryTimerRepository::new(shared.clone()), shared);
    let ctx = RequestContext::background();

    let first = service.start(&ctx).unwrap();
    clock.advance(std::time::Duration::from_secs(5));
    let second = service.start(&ctx).unwrap();
    assert!(second.is_running);
    assert_eq!(second.remaining_time, first.remaining_time - std::time::Duration::from_secs(5));

    let paused = service.pause(&ctx).unwrap();
    let paused_again = service.pause(&ctx).unwrap();
    assert_eq!(paused, paused_again);
}

#[test]
fn note_pages_expose_navigation() {
    let service = NoteService::new(MemoryNoteRepository::seeded());
    let ctx = RequestContext::background();

    let first = service.page(&ctx, 1).unwrap();
    assert!(!first.has_previous);
    assert!(first.has_next);

    let saved = service.save_page(&ctx, 12, "Appendix", 10).unwrap();
    assert_eq!(saved.total_pages, 12);
    let last = service.page(&ctx, 12).unwrap();
    assert!(last.has_previous);
    assert!(!last.has_next);

    assert!(service.page(&ctx, 0).unwrap_err().is_client_error());
}

#[test]
fn question_submission_rules() {
    let clock = Arc::new(ManualClock::new(t0()));
    let service = QuestionService::new(MemoryQuestionRepository::new(clock.clone()));
    let ctx = RequestContext::background();

    let anonymous = service.submit(&ctx, "   ", "  What is RLHF?  ").unwrap();
    assert_eq!(anonymous.name, "Anonymous");
    assert_eq!(anonymous.content, "What is RLHF?");

    assert!(service.submit(&ctx, "Ada", "  ").unwrap_err().is_client_error());
    let too_long = "x".repeat(501);
    assert!(service.submit(&ctx, "Ada", &too_long).unwrap_err().is_client_error());
    service.submit(&ctx, "Ada", &"y".repeat(500)).unwrap();

    assert!(service.mark_answered(&ctx, anonymous.id).unwrap());
    assert!(!service.mark_answered(&ctx, 999).unwrap());

    let queue = service.queue(&ctx).unwrap();
    assert_eq!(queue.open.len(), 1);
    assert_eq!(queue.answered.len(), 1);
    assert_eq!(queue.answered[0].id, anonymous.id);
}
