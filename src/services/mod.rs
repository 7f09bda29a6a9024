//! External collaborators of the break timer
//!
//! This module contains the settings store, the suggestion source, the
//! notification surfaces, and the BreakDue delivery that ties the last two
//! together.

pub mod delivery;
pub mod error;
pub mod notifier;
pub mod settings;
pub mod suggestions;

// Re-export main types
pub use delivery::{deliver_break, DeliveredBreak};
pub use error::{BreakError, NotifyError, StoreError, SuggestionError};
pub use notifier::{
    BreakNotification, DesktopNotifier, LogNotifier, NotificationButton, NotificationId, Notifier,
    SNOOZE_BUTTON_INDEX,
};
pub use settings::{JsonFileStore, MemoryStore, SettingsStore};
pub use suggestions::{pick_suggestion, FileSuggestions, SuggestionSource};
