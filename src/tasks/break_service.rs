//! Break service: the single owner of the break timer
//!
//! Every input (alarms, button clicks, snooze requests, settings changes and
//! delivery reports) arrives as a [`BreakEvent`] on one channel and is handled
//! in order by [`BreakService::handle`]. Nothing else touches the timer.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::{
    mpsc::{UnboundedReceiver, UnboundedSender},
    watch,
};
use tracing::{debug, error, info, warn};

use super::alarms::{AlarmTag, Alarms};
use crate::{
    services::{
        deliver_break, DeliveredBreak, NotificationId, Notifier, SettingsStore, StoreError,
        SuggestionSource, SNOOZE_BUTTON_INDEX,
    },
    state::{BreakReason, BreakStatus, BreakTimer, TickOutcome},
};

/// Inputs of the break service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakEvent {
    Alarm(AlarmTag),
    ButtonClicked {
        notification_id: NotificationId,
        button_index: usize,
    },
    Snooze,
    SettingsChanged,
    /// Outcome of a BreakDue delivery, reported back by the delivery task
    Delivered(Result<DeliveredBreak, String>),
}

/// What handling one event did to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Counted { elapsed: u32 },
    Suspended { until: DateTime<Utc> },
    BreakDue(BreakReason),
    Snoozed { until: DateTime<Utc> },
    IntervalReloaded { interval: u32 },
    DeliveryRecorded,
    Ignored,
}

/// External collaborators of the break service
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn SettingsStore>,
    pub suggestions: Arc<dyn SuggestionSource>,
    pub notifier: Arc<dyn Notifier>,
    pub icon: String,
}

pub struct BreakService {
    timer: BreakTimer,
    collaborators: Collaborators,
    alarms: Alarms,
    events: UnboundedSender<BreakEvent>,
    status: BreakStatus,
    status_tx: watch::Sender<BreakStatus>,
}

impl BreakService {
    /// Build the service from persisted settings. The interval and any
    /// persisted snooze deadline are read once here.
    pub async fn load(
        collaborators: Collaborators,
        events: UnboundedSender<BreakEvent>,
        tick_period: Duration,
    ) -> Result<Self, StoreError> {
        let interval = collaborators.store.break_interval().await?;
        let snooze_deadline = collaborators.store.snooze_end_time().await?;
        let timer = BreakTimer::new(interval, snooze_deadline);

        let mut alarms = Alarms::new(events.clone(), tick_period);
        if let Some(deadline) = snooze_deadline {
            info!("Restoring snooze until {}", deadline);
            alarms.arm_snooze(deadline);
        }

        info!("Break service loaded: interval={}min", interval);

        let status = BreakStatus::new(&timer);
        let (status_tx, _) = watch::channel(status.clone());

        Ok(Self {
            timer,
            collaborators,
            alarms,
            events,
            status,
            status_tx,
        })
    }

    /// Receiver of the status snapshot, updated after every event
    pub fn subscribe(&self) -> watch::Receiver<BreakStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> &BreakStatus {
        &self.status
    }

    pub fn timer(&self) -> &BreakTimer {
        &self.timer
    }

    /// Start the activity alarm and process events until every sender is gone
    pub async fn run(mut self, mut events: UnboundedReceiver<BreakEvent>) {
        self.alarms.start_activity();

        while let Some(event) = events.recv().await {
            debug!("Handling {:?}", event);
            self.handle(event, Utc::now()).await;
        }

        info!("Break service stopped");
    }

    /// Handle one event observed at `now`
    pub async fn handle(&mut self, event: BreakEvent, now: DateTime<Utc>) -> Transition {
        let transition = match event {
            BreakEvent::Alarm(tag) => self.on_alarm(tag, now).await,
            BreakEvent::ButtonClicked {
                notification_id,
                button_index,
            } => self.on_button_clicked(notification_id, button_index, now).await,
            BreakEvent::Snooze => self.snooze(now).await,
            BreakEvent::SettingsChanged => self.reload_interval().await,
            BreakEvent::Delivered(report) => self.record_delivery(report),
        };

        self.status.sync_timer(&self.timer);
        self.status_tx.send_replace(self.status.clone());
        transition
    }

    async fn on_alarm(&mut self, tag: AlarmTag, now: DateTime<Utc>) -> Transition {
        let outcome = match tag {
            AlarmTag::Activity => self.timer.tick(now),
            AlarmTag::Snooze => self.timer.snooze_alarm(now),
        };

        match outcome {
            TickOutcome::Counted { elapsed } => {
                debug!("{}: {}/{} minutes", tag, elapsed, self.timer.interval());
                Transition::Counted { elapsed }
            }
            TickOutcome::Suspended { until } => {
                debug!("{}: snoozed until {}", tag, until);
                Transition::Suspended { until }
            }
            TickOutcome::Stale => {
                debug!("{}: snooze already handled, ignoring", tag);
                Transition::Ignored
            }
            TickOutcome::BreakDue(reason) => {
                self.break_due(reason, now).await;
                Transition::BreakDue(reason)
            }
        }
    }

    async fn break_due(&mut self, reason: BreakReason, now: DateTime<Utc>) {
        info!("Break due ({:?})", reason);
        self.status.breaks_due += 1;
        self.status.last_break_time = Some(now);

        if reason == BreakReason::SnoozeExpired {
            self.alarms.disarm_snooze();
            if let Err(e) = self.collaborators.store.set_snooze_end_time(None).await {
                error!("Failed to clear persisted snooze deadline: {}", e);
            }
        }

        // Delivery runs on its own so a slow suggestion load never holds up
        // ticks or snooze clicks
        let collaborators = self.collaborators.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let report = deliver_break(
                collaborators.suggestions.as_ref(),
                collaborators.notifier.as_ref(),
                &collaborators.icon,
            )
            .await
            .map_err(|e| {
                error!("Break notification not shown: {}", e);
                e.to_string()
            });
            let _ = events.send(BreakEvent::Delivered(report));
        });
    }

    async fn on_button_clicked(
        &mut self,
        notification_id: NotificationId,
        button_index: usize,
        now: DateTime<Utc>,
    ) -> Transition {
        if button_index != SNOOZE_BUTTON_INDEX {
            warn!(
                "Unknown button {} clicked on notification {}",
                button_index, notification_id
            );
            return Transition::Ignored;
        }

        debug!("Snooze clicked on notification {}", notification_id);
        self.snooze(now).await
    }

    async fn snooze(&mut self, now: DateTime<Utc>) -> Transition {
        let until = self.timer.snooze(now);
        self.alarms.arm_snooze(until);
        info!("Snoozed until {}", until);

        if let Err(e) = self.collaborators.store.set_snooze_end_time(Some(until)).await {
            error!("Failed to persist snooze deadline: {}", e);
        }

        Transition::Snoozed { until }
    }

    async fn reload_interval(&mut self) -> Transition {
        match self.collaborators.store.break_interval().await {
            Ok(interval) => {
                // The running counter is deliberately left as is
                self.timer.set_interval(interval);
                info!(
                    "Break interval now {}min (elapsed {}min)",
                    interval,
                    self.timer.elapsed()
                );
                Transition::IntervalReloaded { interval }
            }
            Err(e) => {
                error!("Failed to reload break interval: {}", e);
                Transition::Ignored
            }
        }
    }

    fn record_delivery(&mut self, report: Result<DeliveredBreak, String>) -> Transition {
        match report {
            Ok(delivered) => {
                self.status.last_suggestion = Some(delivered.suggestion);
                self.status.last_error = None;
            }
            Err(e) => {
                self.status.last_error = Some(e);
            }
        }
        Transition::DeliveryRecorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{LogNotifier, MemoryStore, SuggestionError},
        state::{Phase, DEFAULT_BREAK_INTERVAL},
    };
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use tokio::sync::mpsc;

    struct StaticSuggestions(Vec<String>);

    #[async_trait]
    impl SuggestionSource for StaticSuggestions {
        async fn load(&self) -> Result<Vec<String>, SuggestionError> {
            Ok(self.0.clone())
        }
    }

    /// Fixed 09:00 tomorrow, so snooze alarms armed by a test never fire
    /// while it runs
    fn start() -> DateTime<Utc> {
        let tomorrow = (Utc::now() + ChronoDuration::days(1)).date_naive();
        Utc.from_utc_datetime(&tomorrow.and_hms_opt(9, 0, 0).unwrap())
    }

    fn collaborators(store: Arc<MemoryStore>, activities: &[&str]) -> Collaborators {
        Collaborators {
            store,
            suggestions: Arc::new(StaticSuggestions(
                activities.iter().map(|s| s.to_string()).collect(),
            )),
            notifier: Arc::new(LogNotifier::new()),
            icon: "alarm-clock".to_string(),
        }
    }

    async fn service_with_interval(
        interval: u32,
        activities: &[&str],
    ) -> (BreakService, UnboundedReceiver<BreakEvent>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.set_break_interval(interval).await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let service = BreakService::load(
            collaborators(Arc::clone(&store), activities),
            tx,
            Duration::from_secs(60),
        )
        .await
        .unwrap();
        (service, rx, store)
    }

    #[tokio::test]
    async fn test_load_uses_default_interval() {
        let store = Arc::new(MemoryStore::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let service = BreakService::load(collaborators(store, &["Walk"]), tx, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(service.timer().interval(), DEFAULT_BREAK_INTERVAL);
        assert_eq!(service.status().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_break_due_delivers_notification() {
        let (mut service, mut rx, _) = service_with_interval(1, &["Stretch"]).await;

        let transition = service
            .handle(BreakEvent::Alarm(AlarmTag::Activity), start())
            .await;
        assert_eq!(transition, Transition::BreakDue(BreakReason::IntervalElapsed));
        assert_eq!(service.timer().elapsed(), 0);
        assert_eq!(service.status().breaks_due, 1);

        let report = rx.recv().await.unwrap();
        assert_eq!(
            report,
            BreakEvent::Delivered(Ok(DeliveredBreak {
                notification_id: 1,
                suggestion: "Stretch".to_string(),
            }))
        );

        service.handle(report, start()).await;
        assert_eq!(service.status().last_suggestion.as_deref(), Some("Stretch"));
        assert_eq!(service.status().last_error, None);
    }

    #[tokio::test]
    async fn test_empty_suggestions_reported_and_ticking_continues() {
        let (mut service, mut rx, _) = service_with_interval(2, &[]).await;

        service.handle(BreakEvent::Alarm(AlarmTag::Activity), start()).await;
        let transition = service
            .handle(BreakEvent::Alarm(AlarmTag::Activity), start() + ChronoDuration::minutes(1))
            .await;
        assert_eq!(transition, Transition::BreakDue(BreakReason::IntervalElapsed));

        let report = rx.recv().await.unwrap();
        assert!(matches!(report, BreakEvent::Delivered(Err(_))));
        service.handle(report, start()).await;
        assert!(service
            .status()
            .last_error
            .as_deref()
            .unwrap()
            .contains("no suggestions found"));

        let transition = service
            .handle(BreakEvent::Alarm(AlarmTag::Activity), start() + ChronoDuration::minutes(2))
            .await;
        assert_eq!(transition, Transition::Counted { elapsed: 1 });
    }

    #[tokio::test]
    async fn test_snooze_button_persists_deadline() {
        let (mut service, _rx, store) = service_with_interval(60, &["Walk"]).await;

        let transition = service
            .handle(
                BreakEvent::ButtonClicked {
                    notification_id: 3,
                    button_index: 0,
                },
                start(),
            )
            .await;
        let until = start() + ChronoDuration::minutes(10);
        assert_eq!(transition, Transition::Snoozed { until });
        assert_eq!(service.status().phase, Phase::Snoozed);
        assert_eq!(service.status().snooze_end_time, Some(until));
        assert_eq!(store.snooze_end_time().await.unwrap(), Some(until));
    }

    #[tokio::test]
    async fn test_other_buttons_are_ignored() {
        let (mut service, _rx, _) = service_with_interval(60, &["Walk"]).await;
        let transition = service
            .handle(
                BreakEvent::ButtonClicked {
                    notification_id: 3,
                    button_index: 1,
                },
                start(),
            )
            .await;
        assert_eq!(transition, Transition::Ignored);
        assert_eq!(service.status().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_snooze_expiry_clears_persisted_deadline() {
        let (mut service, mut rx, store) = service_with_interval(60, &["Walk"]).await;
        service.handle(BreakEvent::Snooze, start()).await;

        let transition = service
            .handle(
                BreakEvent::Alarm(AlarmTag::Snooze),
                start() + ChronoDuration::minutes(10),
            )
            .await;
        assert_eq!(transition, Transition::BreakDue(BreakReason::SnoozeExpired));
        assert_eq!(store.snooze_end_time().await.unwrap(), None);
        assert_eq!(service.status().phase, Phase::Idle);
        assert!(matches!(rx.recv().await, Some(BreakEvent::Delivered(Ok(_)))));

        // A second snooze alarm for the same deadline is stale
        let transition = service
            .handle(
                BreakEvent::Alarm(AlarmTag::Snooze),
                start() + ChronoDuration::minutes(10),
            )
            .await;
        assert_eq!(transition, Transition::Ignored);
    }

    #[tokio::test]
    async fn test_persisted_snooze_is_restored() {
        let store = Arc::new(MemoryStore::new());
        // Persisted with millisecond precision
        let until = DateTime::from_timestamp_millis(
            (Utc::now() + ChronoDuration::minutes(8)).timestamp_millis(),
        )
        .unwrap();
        store.set_snooze_end_time(Some(until)).await.unwrap();

        let (tx, _rx) = mpsc::unbounded_channel();
        let service = BreakService::load(
            collaborators(store, &["Walk"]),
            tx,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        assert_eq!(service.status().phase, Phase::Snoozed);
        assert_eq!(service.timer().snooze_deadline(), Some(until));
        assert!(service.alarms.snooze_armed());
    }

    #[tokio::test]
    async fn test_settings_change_reloads_interval_without_rescale() {
        let (mut service, _rx, store) = service_with_interval(60, &["Walk"]).await;
        for i in 0..5 {
            service
                .handle(BreakEvent::Alarm(AlarmTag::Activity), start() + ChronoDuration::minutes(i))
                .await;
        }

        store.set_break_interval(30).await.unwrap();
        let transition = service.handle(BreakEvent::SettingsChanged, start()).await;
        assert_eq!(transition, Transition::IntervalReloaded { interval: 30 });
        assert_eq!(service.timer().elapsed(), 5);
        assert_eq!(service.status().break_interval, 30);
    }

    #[tokio::test]
    async fn test_status_watch_follows_events() {
        let (mut service, _rx, _) = service_with_interval(60, &["Walk"]).await;
        let status_rx = service.subscribe();

        service.handle(BreakEvent::Alarm(AlarmTag::Activity), start()).await;
        assert_eq!(status_rx.borrow().elapsed_minutes, 1);

        service.handle(BreakEvent::Snooze, start()).await;
        assert!(status_rx.borrow().is_snoozed());
    }
}
