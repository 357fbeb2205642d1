//! Per-call deadlines and cancellation.
//!
//! Every engine operation takes a [`Deadline`]. Lock waits give up at the
//! deadline, graph searches check it between levels, and mutations check
//! it once more right before they commit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, TrustError};

/// Shared cancellation flag. Clone it, hand one copy to the operation and
/// keep the other to cancel.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An optional point in time plus an optional cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    at: Option<Instant>,
    cancel: Option<CancelFlag>,
}

impl Deadline {
    /// No time limit, not cancellable.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
            cancel: None,
        }
    }

    pub fn at(instant: Instant) -> Self {
        Self {
            at: Some(instant),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn instant(&self) -> Option<Instant> {
        self.at
    }

    /// Time left, `None` if unbounded. Zero once expired.
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail with `Timeout` if the deadline passed or the call was cancelled.
    pub fn check(&self, op: &str) -> Result<()> {
        if self.is_cancelled() {
            log::warn!("{op}: cancelled");
            return Err(TrustError::Timeout(format!("{op} cancelled")));
        }
        if self.is_expired() {
            log::warn!("{op}: deadline exceeded");
            return Err(TrustError::Timeout(format!("{op} deadline exceeded")));
        }
        Ok(())
    }
}
