//! # Call Context
//!
//! Every fetch carries a [`CallContext`]: a cancellation token plus an optional
//! deadline. Waiting on a context never cancels shared work; it only lets the
//! waiting caller stop early with a cancellation-class error.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::error::{ProxyError, ProxyResult};

/// Cancellation and deadline signal for a single logical request.
#[derive(Debug, Clone)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CallContext {
    /// A context with no deadline that is only cancelled explicitly.
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().with_deadline(Instant::now() + timeout)
    }

    /// Tighten the deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// A context cancelled together with `self`, but cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context is already done.
    pub fn check(&self) -> ProxyResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ProxyError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ProxyError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ProxyError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.cancel.cancelled() => ProxyError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ProxyError::DeadlineExceeded,
            },
            None => {
                self.cancel.cancelled().await;
                ProxyError::Cancelled
            }
        }
    }

    /// Drive `fut` until it completes or the context is done, whichever is first.
    ///
    /// Dropping `fut` on cancellation is the caller's concern: pass a handle to
    /// shared work, not the work itself, when other callers depend on it.
    pub async fn run<T, F>(&self, fut: F) -> ProxyResult<T>
    where
        F: Future<Output = ProxyResult<T>>,
    {
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = fut => result,
        }
    }
}
