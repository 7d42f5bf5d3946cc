// src/interfaces/component_interface.rs
//! Standard interfaces for Layer-2 components
//!
//! Every component reports failures through [`ComponentError`] and reads
//! ledger time through a [`Clock`] supplied by the host.

use solana_program::program_error::ProgramError;
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Debug, Display};
use std::rc::Rc;

/// Standard error interface for all Layer-2 components
pub trait ComponentError: Error + Debug + Display {
    /// Get the error code
    fn error_code(&self) -> u32;

    /// Convert the error to a program error
    fn to_program_error(&self) -> ProgramError {
        ProgramError::Custom(self.error_code())
    }

    /// Get the error message
    fn error_message(&self) -> String {
        self.to_string()
    }
}

/// Trusted, monotonically non-decreasing ledger clock (seconds)
pub trait Clock {
    /// Current ledger timestamp
    fn now(&self) -> u64;
}

/// Clock driven explicitly by the caller.
///
/// Clones share the same underlying time, so a test can hand one clone to
/// the rollup and keep another to advance it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Create a clock starting at `start`
    pub fn new(start: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move the clock forward by `seconds`
    pub fn advance(&self, seconds: u64) {
        self.now.set(self.now.get().saturating_add(seconds));
    }

    /// Set the clock to an absolute timestamp
    pub fn set(&self, timestamp: u64) {
        self.now.set(timestamp);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(10);
        let handle = clock.clone();

        handle.advance(5);
        assert_eq!(clock.now(), 15);

        clock.set(100);
        assert_eq!(handle.now(), 100);
    }

    #[test]
    fn test_manual_clock_saturates() {
        let clock = ManualClock::new(u64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now(), u64::MAX);
    }
}
