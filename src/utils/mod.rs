//! Process-level utilities
//!
//! Currently only the shutdown signal handling used by the binary.

pub mod signals;

pub use signals::shutdown_signal;
