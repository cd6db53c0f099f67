/*!
 * Arbiter Core Library
 * Process-supervision core: command arbitration, output stream redirection,
 * and signal-to-event-loop bridging
 */

pub mod arbiter;
pub mod core;
pub mod process;
pub mod reactor;
pub mod redirect;
pub mod signals;

// Re-exports
pub use arbiter::{
    Arbiter, ArbiterError, ArbiterResult, CommandName, ExclusiveGate, GateGuard, StartOutcome,
    StopOutcome, Watcher, WatcherState,
};
pub use process::{ProcessError, ProcessHandle, ProcessResult};
pub use reactor::{EventLoop, Interest, ReactorError, ReactorResult};
pub use redirect::{Redirector, Sink, StreamKind};
pub use signals::{Dispatcher, Signal, SignalAction, SignalBridge, SignalError, SignalResult};
