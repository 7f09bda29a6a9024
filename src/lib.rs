//! Take a Break - reminds you to step away from the keyboard
//!
//! This library counts active minutes, shows a break notification with a
//! random suggested activity once the configured interval has elapsed, and
//! lets the user snooze the reminder for ten minutes.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, BreakStatus, BreakTimer};
pub use api::create_router;
pub use tasks::{BreakEvent, BreakService, Collaborators};
pub use utils::signals::shutdown_signal;
