/*!
 * Reactor Traits
 * Single-threaded event loop seam
 */

use super::types::{Interest, ReactorResult, ReadHandler, ScheduledCallback};
use crate::core::types::Fd;

/// Single-threaded I/O event loop the supervisor core runs against.
///
/// Implementations dispatch registered handlers and scheduled callbacks on
/// one loop thread. `schedule_from_signal` is the only entry point that may
/// be called from interrupt context.
pub trait EventLoop: Send + Sync {
    /// Register a readiness handler for `fd`.
    ///
    /// Fails with [`ReactorError::AddedTwice`](super::ReactorError) if the
    /// descriptor already has a handler and no intervening remove occurred.
    fn add_handler(&self, fd: Fd, handler: ReadHandler, interest: Interest) -> ReactorResult<()>;

    /// Remove the handler for `fd`. Safe no-op when none is registered.
    fn remove_handler(&self, fd: Fd);

    /// Queue `callback` to run on the loop thread.
    ///
    /// Must be async-signal-safe: no locks shared with the loop thread, no
    /// allocation beyond the callback itself. Fails with
    /// [`ReactorError::LoopClosed`](super::ReactorError) when the loop is
    /// unusable.
    fn schedule_from_signal(&self, callback: ScheduledCallback) -> ReactorResult<()>;
}
