//! Break notification surfaces

use std::sync::{
    atomic::{AtomicU32, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use super::error::NotifyError;
use crate::tasks::BreakEvent;

pub type NotificationId = u32;

pub const BREAK_TITLE: &str = "Time for a Break";
pub const SNOOZE_BUTTON_TITLE: &str = "Snooze for 10 minutes";
pub const SNOOZE_BUTTON_INDEX: usize = 0;

/// Most notifications waiting for a button click at once
pub const MAX_ACTION_LISTENERS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationButton {
    pub title: String,
}

/// Everything a notification surface needs to render a break reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
    pub title: String,
    pub message: String,
    pub buttons: Vec<NotificationButton>,
}

impl BreakNotification {
    /// Basic notification with the suggestion text and a single snooze button
    pub fn new(icon: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            kind: "basic".to_string(),
            icon: icon.into(),
            title: BREAK_TITLE.to_string(),
            message: suggestion.into(),
            buttons: vec![NotificationButton {
                title: SNOOZE_BUTTON_TITLE.to_string(),
            }],
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Request display of a notification. Button clicks come back later as
    /// [`BreakEvent::ButtonClicked`].
    async fn show(&self, notification: &BreakNotification) -> Result<NotificationId, NotifyError>;
}

/// Headless notifier that only writes the notification to the log
#[derive(Debug, Default)]
pub struct LogNotifier {
    next_id: AtomicU32,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &BreakNotification) -> Result<NotificationId, NotifyError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "[notification {}] {}: {} (POST /notifications/{}/buttons/{} to snooze)",
            id, notification.title, notification.message, id, SNOOZE_BUTTON_INDEX
        );
        Ok(id)
    }
}

/// Bounded count of blocking waits for notification actions. A wait only
/// ends when the notification server reports the notification closed.
#[derive(Debug)]
pub struct ActionListeners {
    active: AtomicUsize,
    limit: usize,
}

/// Held for the duration of one wait; releases its slot on drop
#[derive(Debug)]
pub struct ListenerSlot {
    listeners: Arc<ActionListeners>,
}

impl ActionListeners {
    pub fn new(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            active: AtomicUsize::new(0),
            limit,
        })
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn try_acquire(self: &Arc<Self>) -> Option<ListenerSlot> {
        self.active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |active| {
                (active < self.limit).then_some(active + 1)
            })
            .ok()
            .map(|_| ListenerSlot {
                listeners: Arc::clone(self),
            })
    }
}

impl Drop for ListenerSlot {
    fn drop(&mut self) {
        self.listeners.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Desktop notifications through the platform notification service
#[derive(Debug)]
pub struct DesktopNotifier {
    app_name: String,
    events: UnboundedSender<BreakEvent>,
    next_id: AtomicU32,
    listeners: Arc<ActionListeners>,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>, events: UnboundedSender<BreakEvent>) -> Self {
        Self {
            app_name: app_name.into(),
            events,
            next_id: AtomicU32::new(0),
            listeners: ActionListeners::new(MAX_ACTION_LISTENERS),
        }
    }

    fn build(&self, notification: &BreakNotification) -> notify_rust::Notification {
        let mut desktop = notify_rust::Notification::new();
        desktop
            .appname(&self.app_name)
            .summary(&notification.title)
            .body(&notification.message)
            .icon(&notification.icon);
        // Action keys are the button indexes so clicks map straight back
        for (index, button) in notification.buttons.iter().enumerate() {
            desktop.action(&index.to_string(), &button.title);
        }
        desktop
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn show(&self, notification: &BreakNotification) -> Result<NotificationId, NotifyError> {
        let desktop = self.build(notification);
        let fallback_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let events = self.events.clone();
        let listeners = Arc::clone(&self.listeners);
        let runtime = tokio::runtime::Handle::current();

        tokio::task::spawn_blocking(move || {
            show_desktop(desktop, fallback_id, events, listeners, runtime)
        })
        .await
        .map_err(|e| NotifyError(format!("notification task failed: {}", e)))?
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn show_desktop(
    desktop: notify_rust::Notification,
    _fallback_id: NotificationId,
    events: UnboundedSender<BreakEvent>,
    listeners: Arc<ActionListeners>,
    runtime: tokio::runtime::Handle,
) -> Result<NotificationId, NotifyError> {
    let handle = desktop.show().map_err(|e| NotifyError(e.to_string()))?;
    let id = handle.id();

    let Some(slot) = listeners.try_acquire() else {
        tracing::warn!(
            "{} notifications still open, not listening for clicks on {}",
            listeners.active(),
            id
        );
        return Ok(id);
    };

    // Blocks until the notification is clicked or closed
    runtime.spawn_blocking(move || {
        let _slot = slot;
        handle.wait_for_action(|action| match action.parse::<usize>() {
            Ok(button_index) => {
                let _ = events.send(BreakEvent::ButtonClicked {
                    notification_id: id,
                    button_index,
                });
            }
            Err(_) => tracing::debug!("Notification {} closed with action {:?}", id, action),
        });
    });

    Ok(id)
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn show_desktop(
    desktop: notify_rust::Notification,
    fallback_id: NotificationId,
    _events: UnboundedSender<BreakEvent>,
    _listeners: Arc<ActionListeners>,
    _runtime: tokio::runtime::Handle,
) -> Result<NotificationId, NotifyError> {
    // Action callbacks are only delivered on freedesktop platforms; elsewhere
    // the snooze button is reachable through the HTTP API
    desktop
        .show()
        .map(drop)
        .map_err(|e| NotifyError(e.to_string()))?;
    Ok(fallback_id)
}
