/*!
 * Redirect Types
 * Stream kinds, sinks, and per-descriptor registrations
 */

use crate::core::types::Pid;
use std::fmt;
use std::sync::Arc;

/// Which output stream of the child a descriptor carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// Consumer of redirected stream bytes.
///
/// Called on the loop thread only. `eof` fires once per stream, after the
/// descriptor reached end-of-stream and was detached.
pub trait Sink: Send + Sync {
    fn write(&self, pid: Pid, data: &[u8]);
    fn eof(&self, pid: Pid);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn write(&self, _pid: Pid, _data: &[u8]) {}
    fn eof(&self, _pid: Pid) {}
}

/// One descriptor's redirection: stream kind, owning process, destination
#[derive(Clone)]
pub struct Registration {
    pub kind: StreamKind,
    pub pid: Pid,
    pub sink: Arc<dyn Sink>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("kind", &self.kind)
            .field("pid", &self.pid)
            .finish()
    }
}
