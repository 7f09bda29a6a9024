//! Shared test doubles for the integration tests

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use take_a_break::{
    services::{
        BreakNotification, MemoryStore, NotificationId, Notifier, NotifyError, SettingsStore,
        SuggestionError, SuggestionSource,
    },
    state::BreakStatus,
    tasks::{BreakEvent, BreakService, Collaborators},
};
use tokio::sync::{mpsc, watch};

/// Records every notification and can be switched into a failing mode
pub struct MockNotifier {
    shown_tx: mpsc::UnboundedSender<BreakNotification>,
    next_id: AtomicU32,
    failing: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BreakNotification>) {
        let (shown_tx, shown_rx) = mpsc::unbounded_channel();
        let notifier = Self {
            shown_tx,
            next_id: AtomicU32::new(0),
            failing: AtomicBool::new(false),
        };
        (notifier, shown_rx)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn show(&self, notification: &BreakNotification) -> Result<NotificationId, NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("mock host declined".to_string()));
        }
        let _ = self.shown_tx.send(notification.clone());
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Suggestion source whose list can be replaced while the service runs.
/// `None` simulates an unreadable resource. Loads can be slowed down to keep a
/// delivery in flight.
pub struct SwappableSuggestions {
    activities: Mutex<Option<Vec<String>>>,
    delay_ms: AtomicU64,
}

impl SwappableSuggestions {
    pub fn new(activities: &[&str]) -> Self {
        Self {
            activities: Mutex::new(Some(to_strings(activities))),
            delay_ms: AtomicU64::new(0),
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn replace(&self, activities: Option<&[&str]>) {
        *self.activities.lock().unwrap() = activities.map(to_strings);
    }
}

#[async_trait]
impl SuggestionSource for SwappableSuggestions {
    async fn load(&self) -> Result<Vec<String>, SuggestionError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.activities
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SuggestionError::LoadFailure {
                path: "mock://activities.json".into(),
                reason: "unreadable".to_string(),
            })
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A break service running in the background with mock collaborators
pub struct Harness {
    pub events: mpsc::UnboundedSender<BreakEvent>,
    pub status: watch::Receiver<BreakStatus>,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<MockNotifier>,
    pub suggestions: Arc<SwappableSuggestions>,
    pub shown: mpsc::UnboundedReceiver<BreakNotification>,
}

impl Harness {
    /// Start a service with the given interval. The real activity alarm is
    /// set to an hour so tests drive ticks explicitly.
    pub async fn start(interval: u32, activities: &[&str]) -> Self {
        let store = Arc::new(MemoryStore::new());
        store.set_break_interval(interval).await.unwrap();
        Self::start_with_store(store, activities).await
    }

    pub async fn start_with_store(store: Arc<MemoryStore>, activities: &[&str]) -> Self {
        let (notifier, shown) = MockNotifier::new();
        let notifier = Arc::new(notifier);
        let suggestions = Arc::new(SwappableSuggestions::new(activities));

        let (events, events_rx) = mpsc::unbounded_channel();
        let service = BreakService::load(
            Collaborators {
                store: store.clone(),
                suggestions: suggestions.clone(),
                notifier: notifier.clone(),
                icon: "alarm-clock".to_string(),
            },
            events.clone(),
            Duration::from_secs(3600),
        )
        .await
        .unwrap();
        let status = service.subscribe();
        tokio::spawn(service.run(events_rx));

        Self {
            events,
            status,
            store,
            notifier,
            suggestions,
            shown,
        }
    }

    pub fn send(&self, event: BreakEvent) {
        self.events.send(event).unwrap();
    }

    /// Wait until the published status satisfies `predicate`
    pub async fn wait_for_status(&mut self, predicate: impl FnMut(&BreakStatus) -> bool) -> BreakStatus {
        tokio::time::timeout(Duration::from_secs(5), self.status.wait_for(predicate))
            .await
            .expect("status never matched")
            .expect("break service stopped")
            .clone()
    }

    /// Next shown notification, if one arrives shortly
    pub async fn next_notification(&mut self) -> Option<BreakNotification> {
        tokio::time::timeout(Duration::from_millis(500), self.shown.recv())
            .await
            .ok()
            .flatten()
    }
}
