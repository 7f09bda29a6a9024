//! Alarm sources feeding the break service
//!
//! Two alarms exist: the periodic activity alarm (one tick per minute) and the
//! one-shot snooze alarm. Both deliver [`BreakEvent::Alarm`] into the same
//! channel and are told apart by their [`AlarmTag`].

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use super::BreakEvent;

/// Length of one tick of the activity alarm
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmTag {
    /// Recurring "one minute elapsed" tick
    Activity,
    /// Fires once when the snooze deadline is reached
    Snooze,
}

impl AlarmTag {
    pub fn name(self) -> &'static str {
        match self {
            AlarmTag::Activity => "activityAlarm",
            AlarmTag::Snooze => "snoozeAlarm",
        }
    }
}

impl fmt::Display for AlarmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owner of the alarm tasks. Dropping it cancels them.
#[derive(Debug)]
pub struct Alarms {
    events: UnboundedSender<BreakEvent>,
    tick_period: Duration,
    activity: Option<JoinHandle<()>>,
    snooze: Option<JoinHandle<()>>,
}

impl Alarms {
    pub fn new(events: UnboundedSender<BreakEvent>, tick_period: Duration) -> Self {
        Self {
            events,
            tick_period,
            activity: None,
            snooze: None,
        }
    }

    /// Start the recurring activity alarm. The first tick arrives one period
    /// from now. Calling this again restarts the schedule.
    pub fn start_activity(&mut self) {
        if let Some(previous) = self.activity.take() {
            previous.abort();
        }

        let events = self.events.clone();
        let period = self.tick_period;
        info!("Starting {} every {:?}", AlarmTag::Activity, period);

        self.activity = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if events.send(BreakEvent::Alarm(AlarmTag::Activity)).is_err() {
                    debug!("Break service gone, stopping {}", AlarmTag::Activity);
                    break;
                }
            }
        }));
    }

    /// Arm the one-shot snooze alarm for `deadline`, replacing a pending one.
    /// A deadline in the past fires immediately.
    pub fn arm_snooze(&mut self, deadline: DateTime<Utc>) {
        self.disarm_snooze();

        let delay = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let events = self.events.clone();
        debug!("Arming {} in {:?}", AlarmTag::Snooze, delay);

        self.snooze = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = events.send(BreakEvent::Alarm(AlarmTag::Snooze));
        }));
    }

    pub fn disarm_snooze(&mut self) {
        if let Some(pending) = self.snooze.take() {
            pending.abort();
        }
    }

    pub fn snooze_armed(&self) -> bool {
        self.snooze
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }
}

impl Drop for Alarms {
    fn drop(&mut self) {
        self.disarm_snooze();
        if let Some(activity) = self.activity.take() {
            activity.abort();
        }
    }
}
