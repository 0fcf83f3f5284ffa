//! Deadline-based countdown for a timed attempt.
//!
//! Remaining time is derived from a stored deadline rather than counted down per
//! tick, so delayed or dropped ticks (a throttled window, a suspended laptop) never
//! stretch the allowance. Ticks only decide *when* the remaining time is observed.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    started_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
    allowance_secs: u32,
    remaining_secs: u32,
}

impl Countdown {
    #[must_use]
    pub fn start(started_at: DateTime<Utc>, allowance_secs: u32) -> Self {
        Self {
            started_at,
            deadline: started_at + Duration::seconds(i64::from(allowance_secs)),
            allowance_secs,
            remaining_secs: allowance_secs,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    #[must_use]
    pub fn allowance_secs(&self) -> u32 {
        self.allowance_secs
    }

    /// Last observed remaining time.
    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Whole seconds left before the deadline at `now`, rounded up.
    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u32 {
        let left_ms = (self.deadline - now).num_milliseconds();
        if left_ms <= 0 {
            return 0;
        }
        let secs = left_ms.saturating_add(999) / 1000;
        u32::try_from(secs)
            .unwrap_or(u32::MAX)
            .min(self.allowance_secs)
    }

    /// Observe the clock and return the new remaining time.
    ///
    /// The value never increases, even if `now` moves backwards.
    pub fn tick(&mut self, now: DateTime<Utc>) -> u32 {
        self.remaining_secs = self.remaining_at(now).min(self.remaining_secs);
        self.remaining_secs
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Time used so far: `allowance - remaining`.
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.allowance_secs - self.remaining_secs
    }
}

/// `HH:MM:SS`, as shown on the test screen.
#[must_use]
pub fn format_hms(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// `1h 2m 3s` / `2m 3s`, as shown on result screens.
#[must_use]
pub fn format_compact(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn remaining_rounds_up_partial_seconds() {
        let start = fixed_now();
        let countdown = Countdown::start(start, 60);

        assert_eq!(countdown.remaining_at(start), 60);
        assert_eq!(countdown.remaining_at(start + Duration::milliseconds(1)), 60);
        assert_eq!(countdown.remaining_at(start + Duration::milliseconds(59_001)), 1);
        assert_eq!(countdown.remaining_at(start + Duration::seconds(60)), 0);
        assert_eq!(countdown.remaining_at(start + Duration::seconds(600)), 0);
    }

    #[test]
    fn tick_never_increases_remaining() {
        let start = fixed_now();
        let mut countdown = Countdown::start(start, 60);

        assert_eq!(countdown.tick(start + Duration::seconds(10)), 50);
        assert_eq!(countdown.tick(start + Duration::seconds(5)), 50);
        assert_eq!(countdown.tick(start - Duration::seconds(30)), 50);
        assert_eq!(countdown.elapsed_secs(), 10);
    }

    #[test]
    fn delayed_ticks_do_not_stretch_the_allowance() {
        let start = fixed_now();
        let mut countdown = Countdown::start(start, 60);

        // A single late tick after 45 seconds of silence observes the real deadline.
        assert_eq!(countdown.tick(start + Duration::seconds(45)), 15);
        assert!(!countdown.is_expired());
        assert_eq!(countdown.tick(start + Duration::seconds(75)), 0);
        assert!(countdown.is_expired());
        assert_eq!(countdown.elapsed_secs(), 60);
    }

    #[test]
    fn formats() {
        assert_eq!(format_hms(3_725), "01:02:05");
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_compact(3_725), "1h 2m 5s");
        assert_eq!(format_compact(65), "1m 5s");
    }
}
