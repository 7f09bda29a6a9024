//! State management module
//!
//! This module contains the break timer state machine, the status snapshot
//! derived from it, and the shared state handed to the HTTP layer.

pub mod app_state;
pub mod break_status;
pub mod break_timer;

// Re-export main types
pub use app_state::AppState;
pub use break_status::BreakStatus;
pub use break_timer::{
    BreakReason, BreakTimer, Phase, TickOutcome, DEFAULT_BREAK_INTERVAL, SNOOZE_MINUTES,
};
