/*!
 * Redirect Module
 * Multiplexes child-process output pipes through event-loop registrations
 */

mod redirector;
mod types;

// Re-export public API
pub use redirector::Redirector;
pub use types::{NullSink, Registration, Sink, StreamKind};
