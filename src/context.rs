//! Per-call context
//!
//! Every facade operation takes a [`CallContext`] carrying an optional
//! deadline and a cancellation token. Store round trips are raced against
//! both, so a hung store never blocks the caller past what it asked for.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{CacheError, Result};

/// Deadline and cancellation signal threaded through a facade call.
///
/// Cloning shares the same token, so cancelling one clone cancels all of
/// them. Use [`CallContext::child`] to derive a context that can be
/// cancelled independently of its parent.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// A context with no deadline that is never cancelled unless its token is.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().timeout(timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// A context driven by an externally owned cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            deadline: None,
            cancel: token,
        }
    }

    /// Tightens the deadline to at most `timeout` from now. An earlier
    /// existing deadline is kept. A timeout too large to represent as an
    /// instant leaves the deadline unchanged.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let Some(candidate) = Instant::now().checked_add(timeout) else {
            return self;
        };
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    /// Derives a context sharing this deadline whose token is a child of ours.
    pub fn child(&self) -> Self {
        Self {
            deadline: self.deadline,
            cancel: self.cancel.child_token(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // == Run ==
    /// Drives `fut` to completion unless the context is cancelled or its
    /// deadline passes first. Dropping `fut` on interruption is the only
    /// cleanup performed; whatever the store already applied stays applied.
    pub(crate) async fn run<F>(&self, op: &'static str, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        if self.cancel.is_cancelled() {
            return Err(CacheError::Cancelled { op });
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CacheError::Cancelled { op }),
            _ = deadline => Err(CacheError::TimedOut { op }),
            out = fut => Ok(out),
        }
    }
}
