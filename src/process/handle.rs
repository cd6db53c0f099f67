/*!
 * Process Handle
 * Seam to the process-spawning layer; the supervisor core never forks
 */

use super::types::ProcessResult;
use crate::core::types::{Fd, Pid};
use futures::future::BoxFuture;

/// Handle to one supervised OS child process.
///
/// Spawning and signalling live outside this crate; the arbiter only drives
/// lifecycle transitions and reads the pipe descriptors the handle exposes.
/// `start` and `stop` resolve when the underlying transition completes, so
/// callers can hold the exclusivity token across the whole operation.
pub trait ProcessHandle: Send {
    /// OS process ID
    fn pid(&self) -> Pid;

    /// Start the child; resolves once the process is up
    fn start(&mut self) -> BoxFuture<'_, ProcessResult<()>>;

    /// Stop the child; resolves once the process is down
    fn stop(&mut self) -> BoxFuture<'_, ProcessResult<()>>;

    /// Whether the child is currently stopped
    fn is_stopped(&self) -> bool;

    /// Stdout pipe descriptor, available once started
    fn stdout_fd(&self) -> Option<Fd>;

    /// Stderr pipe descriptor, available once started
    fn stderr_fd(&self) -> Option<Fd>;

    /// Non-blocking reap check: `Some(exit_code)` once the child has exited
    fn try_wait(&mut self) -> Option<i32>;
}
