//! Break status snapshot published to API readers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BreakTimer, Phase};

/// Point-in-time view of the break service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakStatus {
    pub phase: Phase,
    pub elapsed_minutes: u32,
    pub break_interval: u32,
    pub snooze_end_time: Option<DateTime<Utc>>,
    /// Number of times a break became due since startup
    pub breaks_due: u64,
    pub last_break_time: Option<DateTime<Utc>>,
    /// Suggestion of the last notification that was actually shown
    pub last_suggestion: Option<String>,
    /// Last delivery failure, cleared by the next successful delivery
    pub last_error: Option<String>,
}

impl BreakStatus {
    /// Create a status reflecting a freshly loaded timer
    pub fn new(timer: &BreakTimer) -> Self {
        Self {
            phase: timer.phase(),
            elapsed_minutes: timer.elapsed(),
            break_interval: timer.interval(),
            snooze_end_time: timer.snooze_deadline(),
            breaks_due: 0,
            last_break_time: None,
            last_suggestion: None,
            last_error: None,
        }
    }

    /// Refresh the fields owned by the timer
    pub fn sync_timer(&mut self, timer: &BreakTimer) {
        self.phase = timer.phase();
        self.elapsed_minutes = timer.elapsed();
        self.break_interval = timer.interval();
        self.snooze_end_time = timer.snooze_deadline();
    }

    /// Check if reminders are currently suspended
    pub fn is_snoozed(&self) -> bool {
        self.phase == Phase::Snoozed
    }
}

impl Default for BreakStatus {
    fn default() -> Self {
        Self::new(&BreakTimer::default())
    }
}
