//! Shared state handed to the HTTP handlers

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc::UnboundedSender, watch};
use tracing::warn;

use super::BreakStatus;
use crate::{services::SettingsStore, tasks::BreakEvent};

/// Handles the API uses to reach the break service. The service itself owns
/// the timer; handlers only send events and read the published snapshot.
pub struct AppState {
    /// Event channel into the break service
    pub events: UnboundedSender<BreakEvent>,
    /// Latest status published by the break service
    pub status_rx: watch::Receiver<BreakStatus>,
    /// Settings store shared with the break service
    pub store: Arc<dyn SettingsStore>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        events: UnboundedSender<BreakEvent>,
        status_rx: watch::Receiver<BreakStatus>,
        store: Arc<dyn SettingsStore>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            events,
            status_rx,
            store,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Forward an event to the break service and remember the action
    pub fn send_event(&self, action: &str, event: BreakEvent) -> Result<(), String> {
        self.events
            .send(event)
            .map_err(|e| format!("Break service is not running: {}", e))?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        } else {
            warn!("Failed to record last action {}", action);
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(())
    }

    /// Get the latest published break status
    pub fn get_status(&self) -> BreakStatus {
        self.status_rx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
