//! # Timer handle: the one cancellable unit of work.
//!
//! Each live notification holds at most one [`TimerHandle`], stored inside
//! its bookkeeping entry. Cancelling the handle (manual dismiss/read,
//! teardown) stops the pending auto-dismiss before it fires; a handle whose
//! timer already fired cancels as a no-op.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a pending auto-dismiss task.
pub(crate) struct TimerHandle {
    /// Cancellation for the sleeping task.
    cancel: CancellationToken,
    /// Join handle for the task itself.
    join: JoinHandle<()>,
}

impl TimerHandle {
    pub(crate) fn new(cancel: CancellationToken, join: JoinHandle<()>) -> Self {
        Self { cancel, join }
    }

    /// Cancels the pending timer. Consumes the handle: a cancelled timer
    /// never comes back.
    pub(crate) fn cancel(self) {
        self.cancel.cancel();
        self.join.abort();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
