/*!
 * Signals Module
 * Defers OS signal handling out of interrupt context onto the loop thread
 */

mod bridge;
mod types;

// Re-export public API
pub use bridge::{Emergency, ProcessEmergency, SignalBridge, SIGNAL_PANIC_MSG};
pub use types::{CommandRequest, Dispatcher, Signal, SignalAction, SignalError, SignalResult};
