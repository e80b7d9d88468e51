//! Time-related utilities with clock abstraction for testability.

use chrono::Local;

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get the current local wall-clock time formatted as `HH:MM`
    fn now_hhmm(&self) -> String;
}

/// System clock implementation (uses actual local time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_hhmm(&self) -> String {
        Local::now().format("%H:%M").to_string()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone)]
pub struct FixedClock {
    fixed_time: String,
}

impl FixedClock {
    /// Create a new fixed clock with the given `HH:MM` string
    pub fn new(fixed_time: impl Into<String>) -> Self {
        Self {
            fixed_time: fixed_time.into(),
        }
    }
}

impl Clock for FixedClock {
    fn now_hhmm(&self) -> String {
        self.fixed_time.clone()
    }
}
