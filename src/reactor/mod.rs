/*!
 * Reactor Module
 * Event-loop collaborator contract consumed by the redirector and signal bridge
 */

mod traits;
mod types;

// Re-export public API
pub use traits::EventLoop;
pub use types::{Interest, ReactorError, ReactorResult, ReadHandler, ScheduledCallback};
