//! Event (talk/workshop) model.
//!
//! # Invariants
//! - `is_upcoming` is decided once, from the wall clock at creation time.
//!   Reads do not refresh it; [`partition_by_date`] is the explicit
//!   recomputation for callers that want the live view.

use super::{require_storable_timestamp, require_text, RecordId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    pub speaker: String,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Snapshot of `date > now` taken when the event was created or rescheduled.
    pub is_upcoming: bool,
}

impl Event {
    /// Creates an unsaved event and stamps `is_upcoming` against `now`.
    pub fn new(
        title: impl Into<String>,
        speaker: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            speaker: speaker.into(),
            description: description.into(),
            date,
            is_upcoming: date > now,
        }
    }

    /// Whether the event is still in the future at `now`.
    pub fn is_upcoming_at(&self, now: DateTime<Utc>) -> bool {
        self.date > now
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("event", "title", &self.title)?;
        require_text("event", "speaker", &self.speaker)?;
        require_text("event", "description", &self.description)?;
        require_storable_timestamp("event", "date", self.date)?;
        Ok(())
    }
}

/// Splits events into `(upcoming, past)` by comparing `date` with `now`,
/// rewriting each `is_upcoming` flag. Relative order is preserved.
pub fn partition_by_date(events: Vec<Event>, now: DateTime<Utc>) -> (Vec<Event>, Vec<Event>) {
    events
        .into_iter()
        .map(|mut event| {
            event.is_upcoming = event.is_upcoming_at(now);
            event
        })
        .partition(|event| event.is_upcoming)
}

#[cfg(test)]
mod tests {
    use super::{partition_by_date, Event};
    use crate::model::ValidationError;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn new_event_stamps_upcoming_flag_from_now() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let future = Event::new("t", "s", "d", now + Duration::days(1), now);
        let past = Event::new("t", "s", "d", now - Duration::days(1), now);
        assert!(future.is_upcoming);
        assert!(!past.is_upcoming);
    }

    #[test]
    fn blank_speaker_is_rejected() {
        let now = Utc::now();
        let event = Event::new("Talk", "   ", "about things", now, now);
        assert_eq!(
            event.validate(),
            Err(ValidationError::BlankField {
                entity: "event",
                field: "speaker"
            })
        );
    }

    #[test]
    fn date_past_storable_range_is_rejected() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let far = Utc.with_ymd_and_hms(2300, 1, 1, 18, 0, 0).unwrap();
        let event = Event::new("Talk", "Ada", "about things", far, now);
        assert!(matches!(
            event.validate(),
            Err(ValidationError::TimestampOutOfRange { field: "date", .. })
        ));

        let last_day = Utc.with_ymd_and_hms(2262, 4, 10, 18, 0, 0).unwrap();
        assert_eq!(Event::new("Talk", "Ada", "about", last_day, now).validate(), Ok(()));
    }

    #[test]
    fn partition_recomputes_stale_flags() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let event = Event::new("t", "s", "d", created + Duration::hours(2), created);
        assert!(event.is_upcoming);

        let (upcoming, past) = partition_by_date(vec![event], created + Duration::days(1));
        assert!(upcoming.is_empty());
        assert_eq!(past.len(), 1);
        assert!(!past[0].is_upcoming);
    }
}
