//! Cancellation plumbing for a single cursor, linked into the queue's root
//! shutdown signal so that both a targeted `Unsubscribe` and a global
//! `Dispose` terminate the same dispatch loop.
//!
//! Modeled on the teacher's `ringmpsc-stream::shutdown` trio
//! (`ShutdownState`/`ShutdownHandle`/`ShutdownSignal`), trimmed to the one
//! thing a cursor needs: a single idempotent cancel plus a cheap
//! `is_cancelled` poll and a `cancelled()` future to `select!` against.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// A cloneable cancellation signal. Cloning shares the same underlying
/// state: cancelling any clone cancels all of them.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    state: Arc<CancelState>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self {
            state: Arc::new(CancelState {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Idempotent: a second (or concurrent) call is a no-op.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::AcqRel) {
            self.state.notify.notify_waiters();
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once `cancel` has been called. Safe to `select!` against
    /// repeatedly; if cancellation already happened, resolves immediately.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A pair of linked signals: cancelling the parent cancels every child that
/// was linked to it, but cancelling a child alone leaves the parent (and
/// its other children) untouched. Used so that `Dispose` (parent) can tear
/// down every subscriber while a single `Unsubscribe` (child) only tears
/// down its own dispatch loop.
pub struct LinkedCancel {
    pub child: CancelSignal,
    _link: tokio::task::JoinHandle<()>,
}

impl LinkedCancel {
    pub fn new(parent: &CancelSignal) -> Self {
        let child = CancelSignal::new();
        let parent = parent.clone();
        let link_child = child.clone();
        let link = tokio::spawn(async move {
            parent.cancelled().await;
            link_child.cancel();
        });
        Self {
            child,
            _link: link,
        }
    }
}

impl Drop for LinkedCancel {
    fn drop(&mut self) {
        self._link.abort();
    }
}
