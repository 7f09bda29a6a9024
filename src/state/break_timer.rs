//! Break timing and snooze state machine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Break interval used when nothing valid is stored
pub const DEFAULT_BREAK_INTERVAL: u32 = 60;

/// How long a snooze suspends reminders
pub const SNOOZE_MINUTES: i64 = 10;

/// Whether the timer is counting toward the next break or suspended by a snooze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Snoozed,
}

/// Why a break became due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakReason {
    IntervalElapsed,
    SnoozeExpired,
}

/// Result of feeding one alarm into the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The counter advanced and no break is due yet
    Counted { elapsed: u32 },
    /// A snooze deadline is still in the future; nothing changed
    Suspended { until: DateTime<Utc> },
    /// A snooze alarm arrived after its deadline was already handled
    Stale,
    /// A break notification should be shown now
    BreakDue(BreakReason),
}

/// Elapsed-minute counter plus snooze deadline.
///
/// The counter stays in `[0, interval)` after every tick. While a snooze
/// deadline lies in the future the counter is frozen.
#[derive(Debug, Clone)]
pub struct BreakTimer {
    interval: u32,
    elapsed: u32,
    snooze_deadline: Option<DateTime<Utc>>,
}

impl BreakTimer {
    /// Create a timer with a fresh counter and an optional persisted deadline
    pub fn new(interval: u32, snooze_deadline: Option<DateTime<Utc>>) -> Self {
        Self {
            interval: interval.max(1),
            elapsed: 0,
            snooze_deadline,
        }
    }

    /// Handle a regular one-minute tick
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if let Some(deadline) = self.snooze_deadline {
            if now < deadline {
                return TickOutcome::Suspended { until: deadline };
            }
            return self.expire_snooze();
        }

        self.elapsed += 1;
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            TickOutcome::BreakDue(BreakReason::IntervalElapsed)
        } else {
            TickOutcome::Counted {
                elapsed: self.elapsed,
            }
        }
    }

    /// Handle the one-shot snooze alarm. Unlike [`tick`](Self::tick) this never
    /// advances the counter.
    pub fn snooze_alarm(&mut self, now: DateTime<Utc>) -> TickOutcome {
        match self.snooze_deadline {
            Some(deadline) if now >= deadline => self.expire_snooze(),
            Some(deadline) => TickOutcome::Suspended { until: deadline },
            None => TickOutcome::Stale,
        }
    }

    fn expire_snooze(&mut self) -> TickOutcome {
        self.snooze_deadline = None;
        self.elapsed = 0;
        TickOutcome::BreakDue(BreakReason::SnoozeExpired)
    }

    /// Suspend reminders until `now + 10 minutes`, replacing any earlier deadline
    pub fn snooze(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let deadline = now + Duration::minutes(SNOOZE_MINUTES);
        self.snooze_deadline = Some(deadline);
        deadline
    }

    /// Replace the cached interval. The running counter is left untouched.
    pub fn set_interval(&mut self, interval: u32) {
        self.interval = interval.max(1);
    }

    pub fn phase(&self) -> Phase {
        if self.snooze_deadline.is_some() {
            Phase::Snoozed
        } else {
            Phase::Idle
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn snooze_deadline(&self) -> Option<DateTime<Utc>> {
        self.snooze_deadline
    }
}

impl Default for BreakTimer {
    fn default() -> Self {
        Self::new(DEFAULT_BREAK_INTERVAL, None)
    }
}
