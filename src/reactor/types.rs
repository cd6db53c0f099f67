/*!
 * Reactor Types
 * Handler aliases and event-loop error contract
 */

use crate::core::types::Fd;
use thiserror::Error;

/// Reactor operation result
pub type ReactorResult<T> = Result<T, ReactorError>;

/// Event-loop faults surfaced through the collaborator contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReactorError {
    /// A handler is already registered for this descriptor. Occurrence in
    /// normal operation indicates a violated invariant in the caller: the
    /// redirector avoids it entirely with remove-before-add.
    #[error("fd {0} added twice")]
    AddedTwice(Fd),

    /// The loop can no longer accept work (shut down or corrupted)
    #[error("event loop is closed")]
    LoopClosed,
}

/// I/O readiness the caller wants to be woken for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Readable,
    Writable,
}

/// Per-descriptor readiness handler, invoked on the loop thread
pub type ReadHandler = Box<dyn FnMut() + Send>;

/// Callback handed to the loop from signal context, run on the loop thread
pub type ScheduledCallback = Box<dyn FnOnce() + Send>;
