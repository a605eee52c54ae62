//! Event timeline use-cases.
//!
//! # Invariants
//! - `is_upcoming` is stamped from the service clock on create and on
//!   reschedule, never taken from the caller.
//! - Under [`UpcomingPolicy::Stored`] the timeline shows the flags exactly as
//!   stored; [`UpcomingPolicy::Recompute`] re-derives them on every read.

use crate::clock::Clock;
use crate::context::RequestContext;
use crate::model::event::{partition_by_date, Event};
use crate::model::RecordId;
use crate::repo::event_repo::EventRepository;
use crate::service::ServiceResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// How the timeline decides what is upcoming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpcomingPolicy {
    /// Trust the flag stamped at creation time.
    #[default]
    Stored,
    /// Compare each event date with the current time on read.
    Recompute,
}

/// Input for scheduling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub speaker: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

/// Timeline page content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    pub upcoming: Vec<Event>,
    pub past: Vec<Event>,
}

/// Event service facade over repository implementations.
pub struct EventService<R: EventRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    policy: UpcomingPolicy,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>, policy: UpcomingPolicy) -> Self {
        Self {
            repo,
            clock,
            policy,
        }
    }

    /// Upcoming and past events according to the configured policy.
    pub fn timeline(&self, ctx: &RequestContext) -> ServiceResult<Timeline> {
        let upcoming = self.repo.get_upcoming_events(ctx)?;
        let past = self.repo.get_past_events(ctx)?;

        match self.policy {
            UpcomingPolicy::Stored => Ok(Timeline { upcoming, past }),
            UpcomingPolicy::Recompute => {
                let mut all = upcoming;
                all.extend(past);
                all.sort_by_key(|event| event.id);
                let (upcoming, past) = partition_by_date(all, self.clock.now());
                Ok(Timeline { upcoming, past })
            }
        }
    }

    /// Trims and validates the input, stamps `is_upcoming`, stores the event.
    pub fn add_event(&self, ctx: &RequestContext, input: NewEvent) -> ServiceResult<Event> {
        let event = Event::new(
            input.title.trim(),
            input.speaker.trim(),
            input.description.trim(),
            input.date,
            self.clock.now(),
        );
        event.validate()?;
        Ok(self.repo.add_event(ctx, event)?)
    }

    /// Replaces an event and re-stamps `is_upcoming` for its (possibly new)
    /// date. Returns `false` when the id is unknown.
    pub fn update_event(
        &self,
        ctx: &RequestContext,
        id: RecordId,
        input: NewEvent,
    ) -> ServiceResult<bool> {
        let event = Event {
            id,
            ..Event::new(
                input.title.trim(),
                input.speaker.trim(),
                input.description.trim(),
                input.date,
                self.clock.now(),
            )
        };
        event.validate()?;
        Ok(self.repo.update_event(ctx, &event)?)
    }
}
