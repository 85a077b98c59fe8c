//! Playback scheduler.
//!
//! A periodic timer that is polled by its owner rather than calling back on
//! another thread. The owner asks how many ticks have come due since the
//! last poll and applies them itself, so ticks always run on the owner's
//! context. Dropping the scheduler cancels it; nothing can fire afterwards.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Scheduler {
    period: Duration,
    next_due: Instant,
}

impl Scheduler {
    /// Start ticking every `period`, first tick one period after `now`.
    pub fn start(period: Duration, now: Instant) -> Self {
        let period = period.max(Duration::from_nanos(1));
        Scheduler {
            period,
            next_due: now + period,
        }
    }

    /// Period for `rate` ticks per second.
    pub fn period_for_rate(rate: u32) -> Duration {
        Duration::from_secs(1) / rate.max(1)
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// How long the owner may wait before the next tick is due.
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    /// Count the ticks that have come due at `now` and consume them.
    pub fn due_ticks(&mut self, now: Instant) -> u64 {
        if now < self.next_due {
            return 0;
        }
        let overdue = (now - self.next_due).as_nanos();
        let ticks = overdue / self.period.as_nanos() + 1;
        let ticks = u64::try_from(ticks).unwrap_or(u64::MAX);
        self.next_due += self.period.saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX));
        ticks
    }

    /// Replace this scheduler with one running at `period`.
    ///
    /// The caller must drain `due_ticks(now)` first. The interval that was
    /// running when the swap happened still fires exactly once: at the
    /// previous tick plus the new period, or immediately if that moment has
    /// already passed.
    pub fn retimed(&self, period: Duration, now: Instant) -> Scheduler {
        let period = period.max(Duration::from_nanos(1));
        let last_tick = self.next_due - self.period;
        Scheduler {
            period,
            next_due: (last_tick + period).max(now),
        }
    }
}
