//! Speaker countdown timer and its reconciliation rule.
//!
//! # Responsibility
//! - Define the singleton timer record.
//! - Provide the single [`reconcile`] rule used by every backend on read.
//!
//! # Invariants
//! - `remaining_time <= duration`.
//! - `last_started_at` is `Some` exactly while `is_running`.
//! - Expiry is terminal: once `remaining_time` hits zero the timer stays
//!   stopped until [`Timer::reset`].

use super::{require_storable_duration, require_storable_timestamp, RecordId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Duration used when a store has no timer yet.
pub const DEFAULT_TIMER_DURATION: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub id: RecordId,
    pub duration: Duration,
    pub remaining_time: Duration,
    pub is_running: bool,
    /// Start of the current running slice. Advanced on every reconcile.
    pub last_started_at: Option<DateTime<Utc>>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::with_duration(DEFAULT_TIMER_DURATION)
    }
}

impl Timer {
    /// Stopped, unsaved timer with a full countdown.
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            id: 0,
            duration,
            remaining_time: duration,
            is_running: false,
            last_started_at: None,
        }
    }

    /// Starts a fresh countdown of `duration`, stopped.
    pub fn reset(&mut self, duration: Duration) {
        self.duration = duration;
        self.remaining_time = duration;
        self.is_running = false;
        self.last_started_at = None;
    }

    /// Stopped -> Running. Returns `false` when already running or expired.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running || self.remaining_time.is_zero() {
            return false;
        }
        self.is_running = true;
        self.last_started_at = Some(now);
        true
    }

    /// Running -> Stopped, keeping whatever time is left at `now`.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        let settled = reconcile(self, now);
        *self = Self {
            is_running: false,
            last_started_at: None,
            ..settled
        };
    }

    /// Stopped with nothing left on the clock.
    pub fn is_expired(&self) -> bool {
        !self.is_running && self.remaining_time.is_zero()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_storable_duration(self.duration)?;
        if self.remaining_time > self.duration {
            return Err(ValidationError::RemainingExceedsDuration {
                remaining: self.remaining_time,
                duration: self.duration,
            });
        }
        if self.is_running && self.last_started_at.is_none() {
            return Err(ValidationError::RunningWithoutStart);
        }
        if let Some(started) = self.last_started_at {
            require_storable_timestamp("timer", "last_started_at", started)?;
        }
        Ok(())
    }
}

/// Settles a timer against `now`.
///
/// - Stopped timers come back unchanged.
/// - While running, the time since `last_started_at` is charged against
///   `remaining_time` and `last_started_at` moves to `now`, so calling this
///   again later only charges the new interval.
/// - When the charge reaches the remaining time the timer stops at zero.
///
/// Elapsed time is never negative: a clock that stepped backwards charges
/// nothing.
pub fn reconcile(timer: &Timer, now: DateTime<Utc>) -> Timer {
    if !timer.is_running {
        return timer.clone();
    }

    let elapsed = timer
        .last_started_at
        .and_then(|started| (now - started).to_std().ok())
        .unwrap_or(Duration::ZERO);

    if elapsed < timer.remaining_time {
        Timer {
            remaining_time: timer.remaining_time - elapsed,
            last_started_at: Some(now),
            ..timer.clone()
        }
    } else {
        Timer {
            remaining_time: Duration::ZERO,
            is_running: false,
            last_started_at: None,
            ..timer.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile, Timer};
    use crate::model::ValidationError;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    #[test]
    fn stopped_timer_is_returned_verbatim() {
        let timer = Timer::with_duration(Duration::from_secs(60));
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(reconcile(&timer, now), timer);
    }

    #[test]
    fn clock_stepping_backwards_charges_nothing() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 10, 0).unwrap();
        let mut timer = Timer::with_duration(Duration::from_secs(60));
        timer.start(t0);

        let earlier = t0 - chrono::Duration::seconds(5);
        let settled = reconcile(&timer, earlier);
        assert_eq!(settled.remaining_time, Duration::from_secs(60));
        assert!(settled.is_running);
    }

    #[test]
    fn expired_timer_cannot_start() {
        let mut timer = Timer::with_duration(Duration::from_secs(60));
        timer.remaining_time = Duration::ZERO;
        assert!(!timer.start(Utc::now()));
        assert!(timer.is_expired());
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut timer = Timer::with_duration(Duration::from_secs(600));
        timer.start(t0);
        timer.pause(t0 + chrono::Duration::seconds(100));

        assert!(!timer.is_running);
        assert_eq!(timer.remaining_time, Duration::from_secs(500));
        assert_eq!(timer.last_started_at, None);
    }

    #[test]
    fn validate_rejects_unstorable_duration() {
        let centuries = Duration::from_secs(300 * 365 * 24 * 60 * 60);
        assert_eq!(
            Timer::with_duration(centuries).validate(),
            Err(ValidationError::DurationOutOfRange(centuries))
        );
    }

    #[test]
    fn validate_rejects_remaining_above_duration() {
        let mut timer = Timer::with_duration(Duration::from_secs(10));
        timer.remaining_time = Duration::from_secs(11);
        assert!(matches!(
            timer.validate(),
            Err(ValidationError::RemainingExceedsDuration { .. })
        ));
    }
}
