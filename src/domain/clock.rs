//! Source of "today"
//!
//! The codec never reads the system clock itself. Tasks without a due date
//! anchor their recurrence rules on whatever day the injected clock reports.

use chrono::Utc;

use super::date::DateValue;

/// Provides the current calendar day
pub trait Clock {
    fn today(&self) -> DateValue;
}

/// The system clock, truncated to the UTC day
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DateValue {
        DateValue::from(Utc::now().date_naive())
    }
}

/// A clock pinned to one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateValue);

impl Clock for FixedClock {
    fn today(&self) -> DateValue {
        self.0
    }
}
