//! Speaker timer use-cases.
//!
//! Start and pause are read-then-write sequences over `get_timer` and
//! `update_timer`; the repository settles the timer on the read, so the
//! write always starts from an up-to-date remaining time.

use crate::clock::Clock;
use crate::context::RequestContext;
use crate::model::timer::Timer;
use crate::repo::timer_repo::TimerRepository;
use crate::service::{ServiceError, ServiceResult};
use std::sync::Arc;
use std::time::Duration;

/// Longest countdown accepted by [`TimerService::reset`].
pub const MAX_TIMER_MINUTES: u32 = 240;

/// Timer service facade over repository implementations.
pub struct TimerService<R: TimerRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: TimerRepository> TimerService<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Current timer, settled against now.
    pub fn current(&self, ctx: &RequestContext) -> ServiceResult<Timer> {
        Ok(self.repo.get_timer(ctx)?)
    }

    /// Starts the countdown. Running or expired timers are returned as-is.
    pub fn start(&self, ctx: &RequestContext) -> ServiceResult<Timer> {
        let mut timer = self.repo.get_timer(ctx)?;
        if !timer.start(self.clock.now()) {
            return Ok(timer);
        }
        Ok(self.repo.update_timer(ctx, &timer)?)
    }

    /// Stops the countdown, keeping the remaining time.
    pub fn pause(&self, ctx: &RequestContext) -> ServiceResult<Timer> {
        let mut timer = self.repo.get_timer(ctx)?;
        if !timer.is_running {
            return Ok(timer);
        }
        timer.pause(self.clock.now());
        Ok(self.repo.update_timer(ctx, &timer)?)
    }

    /// Loads a fresh, stopped countdown of `minutes` (1..=240).
    pub fn reset(&self, ctx: &RequestContext, minutes: u32) -> ServiceResult<Timer> {
        if minutes == 0 || minutes > MAX_TIMER_MINUTES {
            return Err(ServiceError::InvalidInput(format!(
                "timer minutes must be between 1 and {MAX_TIMER_MINUTES}, got {minutes}"
            )));
        }
        let duration = Duration::from_secs(u64::from(minutes) * 60);
        Ok(self.repo.reset_timer(ctx, duration)?)
    }
}

/// Formats a duration as `MM:SS`, rounding partial seconds up so a running
/// timer only shows `00:00` once it has actually expired.
pub fn format_clock(value: Duration) -> String {
    let mut seconds = value.as_secs();
    if value.subsec_nanos() > 0 {
        seconds += 1;
    }
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::format_clock;
    use std::time::Duration;

    #[test]
    fn format_clock_pads_and_rounds_up() {
        assert_eq!(format_clock(Duration::from_secs(600)), "10:00");
        assert_eq!(format_clock(Duration::from_millis(59_001)), "01:00");
        assert_eq!(format_clock(Duration::ZERO), "00:00");
        assert_eq!(format_clock(Duration::from_secs(125 * 60)), "125:00");
    }
}
