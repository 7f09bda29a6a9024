//! Background tasks module
//!
//! This module contains the alarm sources and the break service that consumes
//! them alongside the HTTP server.

pub mod alarms;
pub mod break_service;

// Re-export main types
pub use alarms::{AlarmTag, Alarms, DEFAULT_TICK_PERIOD};
pub use break_service::{BreakEvent, BreakService, Collaborators, Transition};
