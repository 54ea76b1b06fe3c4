//! Spawn countdown: one decrement per tick, warnings at fixed thresholds,
//! and a wave trigger when the counter runs out.

use std::collections::BTreeSet;

/// What a single countdown tick asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Nothing to announce and no wave due.
    Idle,
    /// `remaining` hit an announcement threshold.
    Announce { remaining: u64 },
    /// The counter ran out; a wave is due and the counter was reset.
    Expired,
}

#[derive(Debug, Clone)]
pub struct CountdownController {
    remaining: u64,
    interval: u64,
    thresholds: BTreeSet<u64>,
}

impl CountdownController {
    /// Creates a countdown starting at `interval`.
    ///
    /// An interval of zero is clamped to one; configuration validation
    /// rejects it before it gets here.
    pub fn new(interval: u64, thresholds: impl IntoIterator<Item = u64>) -> Self {
        let interval = interval.max(1);
        Self {
            remaining: interval,
            interval,
            thresholds: thresholds.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Advances the countdown by one second.
    ///
    /// The counter only ever decreases by one inside a cycle, so each
    /// threshold fires at most once per cycle.
    pub fn tick(&mut self) -> CountdownStep {
        self.remaining = self.remaining.saturating_sub(1);

        if self.remaining == 0 {
            self.remaining = self.interval;
            return CountdownStep::Expired;
        }

        if self.thresholds.contains(&self.remaining) {
            CountdownStep::Announce {
                remaining: self.remaining,
            }
        } else {
            CountdownStep::Idle
        }
    }
}

/// Formats a duration for broadcasts, using the largest whole unit.
///
/// `3661` becomes `"1 hour"`, `120` becomes `"2 minutes"`, `1` becomes
/// `"1 second"`.
pub fn format_time(seconds: u64) -> String {
    let (value, unit) = if seconds >= 3600 {
        (seconds / 3600, "hour")
    } else if seconds >= 60 {
        (seconds / 60, "minute")
    } else {
        (seconds, "second")
    };
    let plural = if value > 1 { "s" } else { "" };
    format!("{value} {unit}{plural}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ANNOUNCE_THRESHOLDS;

    const NO_THRESHOLDS: [u64; 0] = [];

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(3661), "1 hour");
        assert_eq!(format_time(7200), "2 hours");
        assert_eq!(format_time(3599), "59 minutes");
        assert_eq!(format_time(120), "2 minutes");
        assert_eq!(format_time(60), "1 minute");
        assert_eq!(format_time(59), "59 seconds");
        assert_eq!(format_time(1), "1 second");
        assert_eq!(format_time(0), "0 second");
    }

    #[test]
    fn test_decrements_by_one() {
        let mut countdown = CountdownController::new(300, NO_THRESHOLDS);
        for expected in (1..300).rev() {
            assert_eq!(countdown.tick(), CountdownStep::Idle);
            assert_eq!(countdown.remaining(), expected);
        }
    }

    #[test]
    fn test_expires_and_resets() {
        let mut countdown = CountdownController::new(3, NO_THRESHOLDS);
        assert_eq!(countdown.tick(), CountdownStep::Idle);
        assert_eq!(countdown.tick(), CountdownStep::Idle);
        assert_eq!(countdown.tick(), CountdownStep::Expired);
        assert_eq!(countdown.remaining(), 3);
    }

    #[test]
    fn test_announces_at_sixty() {
        let mut countdown = CountdownController::new(300, DEFAULT_ANNOUNCE_THRESHOLDS);
        while countdown.remaining() > 61 {
            countdown.tick();
        }
        assert_eq!(countdown.tick(), CountdownStep::Announce { remaining: 60 });
        assert_eq!(format_time(60), "1 minute");
    }

    #[test]
    fn test_each_threshold_fires_once_per_cycle() {
        let mut countdown = CountdownController::new(300, DEFAULT_ANNOUNCE_THRESHOLDS);
        let mut announced = Vec::new();
        let mut expirations = 0;

        for _ in 0..600 {
            match countdown.tick() {
                CountdownStep::Announce { remaining } => announced.push(remaining),
                CountdownStep::Expired => expirations += 1,
                CountdownStep::Idle => {}
            }
        }

        assert_eq!(expirations, 2);
        // A reset lands on 300 without announcing it; the first announced
        // value of every cycle is the next threshold below the interval.
        let per_cycle = [60, 30, 15, 10, 5, 4, 3, 2, 1];
        let expected: Vec<u64> = per_cycle.iter().chain(per_cycle.iter()).copied().collect();
        assert_eq!(announced, expected);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut countdown = CountdownController::new(0, NO_THRESHOLDS);
        assert_eq!(countdown.interval(), 1);
        assert_eq!(countdown.tick(), CountdownStep::Expired);
        assert_eq!(countdown.tick(), CountdownStep::Expired);
    }
}
