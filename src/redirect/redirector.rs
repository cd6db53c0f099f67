/*!
 * Stream Redirector
 * Owns per-descriptor read handlers registered with the event loop
 */

use super::types::{Registration, Sink, StreamKind};
use crate::core::types::{Fd, Pid};
use crate::reactor::{EventLoop, Interest, ReadHandler};
use log::{debug, error, warn};
use nix::errno::Errno;
use nix::unistd;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const READ_CHUNK: usize = 4096;

#[derive(Default)]
struct Inner {
    /// Descriptors known to the redirector, attached or not
    pipes: HashMap<Fd, Registration>,
    /// Descriptors with a live event-loop handler
    active: HashSet<Fd>,
}

/// Multiplexes child-process output descriptors onto one event loop.
///
/// Bookkeeping is mutated on the loop thread only. At most one registration
/// and one live handler exist per descriptor; attaching an already-attached
/// descriptor is a no-op, and every attach clears any stale loop handler
/// first so local state and the loop can never produce an "added twice"
/// fault even after drifting apart.
pub struct Redirector {
    inner: Arc<Mutex<Inner>>,
    event_loop: Arc<dyn EventLoop>,
}

impl Redirector {
    pub fn new(event_loop: Arc<dyn EventLoop>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            event_loop,
        }
    }

    /// Record a descriptor and attach it. Replaces any prior registration
    /// for the same descriptor.
    pub fn add_pipe(&mut self, fd: Fd, kind: StreamKind, pid: Pid, sink: Arc<dyn Sink>) -> usize {
        self.detach(fd);
        self.inner.lock().pipes.insert(
            fd,
            Registration {
                kind,
                pid,
                sink: Arc::clone(&sink),
            },
        );
        self.attach(fd, kind, pid, sink)
    }

    /// Detach a descriptor and forget its registration
    pub fn remove_pipe(&mut self, fd: Fd) -> usize {
        let removed = self.detach(fd);
        self.inner.lock().pipes.remove(&fd);
        removed
    }

    /// Register a read handler for `fd`. Returns the number of
    /// registrations changed: 0 when already attached, 1 otherwise.
    pub fn attach(&mut self, fd: Fd, kind: StreamKind, pid: Pid, sink: Arc<dyn Sink>) -> usize {
        if self.inner.lock().active.contains(&fd) {
            return 0;
        }

        // The loop and local bookkeeping can drift (a stale or external
        // registration may exist); removal of an absent handler is a safe
        // no-op, so always clear before adding.
        self.event_loop.remove_handler(fd);

        let handler = self.read_handler(fd);
        if let Err(err) = self.event_loop.add_handler(fd, handler, Interest::Readable) {
            error!("could not register read handler for fd {}: {}", fd, err);
            return 0;
        }

        let mut inner = self.inner.lock();
        inner.pipes.insert(fd, Registration { kind, pid, sink });
        inner.active.insert(fd);
        debug!("attached {} fd {} for pid {}", kind, fd, pid);
        1
    }

    /// Remove the read handler for `fd`. Returns the number of
    /// registrations changed: 1 when it was attached, 0 otherwise.
    pub fn detach(&mut self, fd: Fd) -> usize {
        self.event_loop.remove_handler(fd);
        if self.inner.lock().active.remove(&fd) {
            debug!("detached fd {}", fd);
            1
        } else {
            0
        }
    }

    /// Attach every known descriptor that is not yet active. Returns the
    /// number newly attached.
    pub fn start(&mut self) -> usize {
        let pending: Vec<(Fd, Registration)> = {
            let inner = self.inner.lock();
            inner
                .pipes
                .iter()
                .filter(|(fd, _)| !inner.active.contains(fd))
                .map(|(fd, reg)| (*fd, reg.clone()))
                .collect()
        };

        let mut attached = 0;
        for (fd, reg) in pending {
            attached += self.attach(fd, reg.kind, reg.pid, reg.sink);
        }
        attached
    }

    /// Detach every active descriptor. Returns the number removed.
    pub fn stop(&mut self) -> usize {
        let active: Vec<Fd> = self.inner.lock().active.iter().copied().collect();
        active.into_iter().map(|fd| self.detach(fd)).sum()
    }

    /// Whether `fd` currently has a live handler
    pub fn is_active(&self, fd: Fd) -> bool {
        self.inner.lock().active.contains(&fd)
    }

    /// Number of live handlers
    pub fn active_count(&self) -> usize {
        self.inner.lock().active.len()
    }

    /// Number of known descriptors, attached or not
    pub fn pipe_count(&self) -> usize {
        self.inner.lock().pipes.len()
    }

    /// Registration for `fd`, if known
    pub fn registration(&self, fd: Fd) -> Option<Registration> {
        self.inner.lock().pipes.get(&fd).cloned()
    }

    fn read_handler(&self, fd: Fd) -> ReadHandler {
        let inner = Arc::clone(&self.inner);
        let event_loop = Arc::clone(&self.event_loop);
        Box::new(move || Self::handle_read(&inner, event_loop.as_ref(), fd))
    }

    /// Readiness callback for one descriptor, run on the loop thread.
    ///
    /// A failure here is isolated to its descriptor: the fd is detached and
    /// every other registration keeps being served.
    fn handle_read(inner: &Mutex<Inner>, event_loop: &dyn EventLoop, fd: Fd) {
        let reg = inner.lock().pipes.get(&fd).cloned();
        let reg = match reg {
            Some(reg) => reg,
            None => {
                // Active set and pipe map must stay consistent; readiness
                // without a registration means the invariant broke elsewhere.
                warn!("readiness on unregistered fd {}, removing handler", fd);
                event_loop.remove_handler(fd);
                inner.lock().active.remove(&fd);
                return;
            }
        };

        let mut buf = [0u8; READ_CHUNK];
        match unistd::read(fd, &mut buf) {
            Ok(0) => {
                event_loop.remove_handler(fd);
                inner.lock().active.remove(&fd);
                debug!("{} fd {} reached end of stream (pid {})", reg.kind, fd, reg.pid);
                reg.sink.eof(reg.pid);
            }
            Ok(n) => reg.sink.write(reg.pid, &buf[..n]),
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => {}
            Err(err) => {
                warn!(
                    "read error on {} fd {} (pid {}): {}",
                    reg.kind, fd, reg.pid, err
                );
                event_loop.remove_handler(fd);
                inner.lock().active.remove(&fd);
            }
        }
    }
}
