/*!
 * Arbiter Module
 * Top-level coordinator: watcher collection plus the exclusivity gate
 */

mod arbiter;
mod gate;
mod types;
mod watcher;

// Re-export public API
pub use arbiter::Arbiter;
pub use gate::{ExclusiveGate, GateGuard};
pub use types::{ArbiterError, ArbiterResult, CommandName, StartOutcome, StopOutcome, WatcherState};
pub use watcher::Watcher;
