/*!
 * Signal Bridge
 * Schedules safe signal handling on the loop thread from interrupt context
 */

use super::types::{CommandRequest, Dispatcher, Signal, SignalAction};
use crate::reactor::EventLoop;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Diagnostic written straight to fd 2 when deferral itself fails
pub const SIGNAL_PANIC_MSG: &[u8] = b"CRITICAL: Failed to handle signal safely\n";

/// Last-resort exit used when a signal cannot be deferred to the loop.
///
/// The process is in an unknown state at that point, so the contract is
/// write-and-exit with signal-safe primitives only: no unwinding, no
/// destructors, no allocation.
pub trait Emergency: Send + Sync {
    fn fail_fast(&self);
}

/// Production emergency path: raw write to stderr, then immediate exit
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEmergency;

impl Emergency for ProcessEmergency {
    fn fail_fast(&self) {
        // SAFETY: write(2) and _exit(2) are async-signal-safe; no Rust
        // runtime machinery runs after this point.
        unsafe {
            libc::write(
                libc::STDERR_FILENO,
                SIGNAL_PANIC_MSG.as_ptr().cast(),
                SIGNAL_PANIC_MSG.len(),
            );
            libc::_exit(1);
        }
    }
}

/// Bridges OS signal delivery onto the loop thread.
///
/// [`signal`](SignalBridge::signal) is the only entry point safe in
/// interrupt context; everything else runs with full loop-thread safety.
/// Each delivered signal flows raised -> scheduled -> handled exactly once.
#[derive(Clone)]
pub struct SignalBridge {
    event_loop: Arc<dyn EventLoop>,
    dispatcher: Arc<dyn Dispatcher>,
    emergency: Arc<dyn Emergency>,
}

impl SignalBridge {
    pub fn new(event_loop: Arc<dyn EventLoop>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            event_loop,
            dispatcher,
            emergency: Arc::new(ProcessEmergency),
        }
    }

    /// Replace the emergency path (tests observe it instead of dying)
    #[must_use]
    pub fn with_emergency(mut self, emergency: Arc<dyn Emergency>) -> Self {
        self.emergency = emergency;
        self
    }

    /// Interrupt-context entry point.
    ///
    /// Does exactly one thing: hand `handle_in_main_thread(signum)` to the
    /// loop's signal-safe scheduling primitive. No lookups, no formatting,
    /// no logging here; any of those may contend for locks held by the
    /// interrupted thread.
    pub fn signal(&self, signum: i32) {
        let bridge = self.clone();
        let scheduled = self
            .event_loop
            .schedule_from_signal(Box::new(move || bridge.handle_in_main_thread(signum)));
        if scheduled.is_err() {
            self.emergency.fail_fast();
        }
    }

    /// Loop-thread half of a signal delivery
    pub fn handle_in_main_thread(&self, signum: i32) {
        let signal = match Signal::from_number(signum) {
            Ok(signal) => signal,
            Err(_) => {
                warn!("ignoring unsupported signal {}", signum);
                return;
            }
        };

        info!("Got signal {}", signal.canonical_name());

        let request = match signal.action() {
            SignalAction::Quit => CommandRequest::quit(),
            SignalAction::ReloadGraceful => CommandRequest::reload_graceful(),
            SignalAction::Ignore => {
                debug!("no handler mapped for {}", signal.canonical_name());
                return;
            }
        };

        match serde_json::to_vec(&request) {
            Ok(payload) => self.dispatcher.dispatch(&payload),
            Err(err) => error!("could not serialize {} command: {}", request.command, err),
        }
    }
}
