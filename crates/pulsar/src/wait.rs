//! Bounded polling for flaky browser state.
//!
//! Browser rendering is timing-dependent; the helpers in this crate absorb
//! that flakiness by putting a bounded poll in front of otherwise
//! synchronous engine calls. Every poll derives its own deadline from a
//! [`WaitBudget`] at the start of the call — there is no cross-call
//! deadline propagation.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

use crate::result::{PulsarError, PulsarResult};

/// Interval between poll probes (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default wait budget applied when none is configured (10 seconds)
pub const DEFAULT_WAIT_SECS: u64 = 10;

/// Maximum seconds an explicit poll may block before declaring timeout.
///
/// Fixed at helper construction and applied to every explicit wait that
/// helper performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaitBudget {
    secs: u64,
}

impl WaitBudget {
    /// Create a budget of whole seconds
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    /// Budget in whole seconds
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.secs
    }

    /// Budget in milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.secs * 1000
    }

    /// Budget as a [`Duration`]
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.secs)
    }
}

impl Default for WaitBudget {
    fn default() -> Self {
        Self::from_secs(DEFAULT_WAIT_SECS)
    }
}

/// Poll an async probe until it produces a value or the budget elapses.
///
/// The probe contract:
/// - `Ok(Some(value))` — condition met, the value is returned;
/// - `Ok(None)` — condition not met yet, keep polling;
/// - `Err(e)` — a real failure, propagated immediately without waiting
///   out the budget.
///
/// The probe always runs at least once, even with a zero budget. On
/// deadline the result is [`PulsarError::Timeout`] carrying the budget.
///
/// # Errors
///
/// Returns `Timeout` when the budget elapses, or the probe's own error.
pub async fn poll_until<T, F, Fut>(budget: WaitBudget, mut probe: F) -> PulsarResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PulsarResult<Option<T>>>,
{
    let deadline = Instant::now() + budget.as_duration();
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if Instant::now() >= deadline {
            return Err(PulsarError::Timeout {
                ms: budget.as_millis(),
            });
        }
        tokio::time::sleep(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)).await;
    }
}
