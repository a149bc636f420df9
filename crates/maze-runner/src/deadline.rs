//! Cooperative cancellation shared by the generator and the solver.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// A point in time after which work must stop.
///
/// Checked before every unit of work; nothing is preempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires
    pub fn none() -> Self {
        Self { at: None }
    }

    /// Expire `timeout` from now. A zero timeout means no deadline.
    pub fn after(timeout: Duration) -> Self {
        if timeout.is_zero() {
            Self::none()
        } else {
            Self {
                at: Instant::now().checked_add(timeout),
            }
        }
    }

    /// Expire at a fixed instant
    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    pub fn is_expired(&self) -> bool {
        match self.at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }

    /// Fail with [`Error::Cancelled`] once the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.is_expired() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
