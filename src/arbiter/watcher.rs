/*!
 * Watcher
 * One named, supervised unit of child processes
 */

use super::types::{ArbiterResult, WatcherState};
use crate::process::ProcessHandle;
use crate::redirect::{NullSink, Redirector, Sink, StreamKind};
use log::{debug, info, warn};
use std::sync::Arc;

/// A configured, named unit of one or more supervised child processes.
///
/// Owned by the arbiter's watcher collection; all mutation happens on the
/// loop thread through arbiter commands.
pub struct Watcher {
    name: String,
    autostart: bool,
    on_demand: bool,
    state: WatcherState,
    processes: Vec<Box<dyn ProcessHandle>>,
    stdout_sink: Arc<dyn Sink>,
    stderr_sink: Arc<dyn Sink>,
}

impl Watcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            autostart: true,
            on_demand: false,
            state: WatcherState::Stopped,
            processes: Vec::new(),
            stdout_sink: Arc::new(NullSink),
            stderr_sink: Arc::new(NullSink),
        }
    }

    #[must_use]
    pub fn with_autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    #[must_use]
    pub fn with_on_demand(mut self, on_demand: bool) -> Self {
        self.on_demand = on_demand;
        self
    }

    #[must_use]
    pub fn with_stdout_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.stdout_sink = sink;
        self
    }

    #[must_use]
    pub fn with_stderr_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.stderr_sink = sink;
        self
    }

    #[must_use]
    pub fn with_process(mut self, handle: Box<dyn ProcessHandle>) -> Self {
        self.processes.push(handle);
        self
    }

    pub fn add_process(&mut self, handle: Box<dyn ProcessHandle>) {
        self.processes.push(handle);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn autostart(&self) -> bool {
        self.autostart
    }

    pub fn on_demand(&self) -> bool {
        self.on_demand
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, WatcherState::Stopped)
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Start every process and attach its pipes. Returns whether a start
    /// actually happened; an already-running watcher is left untouched.
    pub(crate) async fn start(&mut self, redirector: &mut Redirector) -> ArbiterResult<bool> {
        if !self.is_stopped() {
            return Ok(false);
        }

        self.state = WatcherState::Starting;
        for handle in &mut self.processes {
            if let Err(err) = handle.start().await {
                self.state = WatcherState::Stopped;
                return Err(err.into());
            }
        }

        for handle in &self.processes {
            let pid = handle.pid();
            if let Some(fd) = handle.stdout_fd() {
                redirector.add_pipe(fd, StreamKind::Stdout, pid, Arc::clone(&self.stdout_sink));
            }
            if let Some(fd) = handle.stderr_fd() {
                redirector.add_pipe(fd, StreamKind::Stderr, pid, Arc::clone(&self.stderr_sink));
            }
        }

        self.state = WatcherState::Running;
        info!("watcher {} started", self.name);
        Ok(true)
    }

    /// Stop every process after detaching its pipes. Returns whether a stop
    /// actually happened. The watcher always ends up Stopped, even when a
    /// process reports a stop failure; the first such failure is returned.
    pub(crate) async fn stop(&mut self, redirector: &mut Redirector) -> ArbiterResult<bool> {
        if self.is_stopped() {
            return Ok(false);
        }

        self.state = WatcherState::Stopping;
        let mut first_error = None;
        for handle in &mut self.processes {
            if let Some(fd) = handle.stdout_fd() {
                redirector.remove_pipe(fd);
            }
            if let Some(fd) = handle.stderr_fd() {
                redirector.remove_pipe(fd);
            }
            if let Err(err) = handle.stop().await {
                warn!("watcher {}: {}", self.name, err);
                first_error.get_or_insert(err);
            }
        }

        self.state = WatcherState::Stopped;
        info!("watcher {} stopped", self.name);
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(true),
        }
    }

    /// Emergency-stop variant: never fails, every process is told to stop
    /// and the watcher is forced into Stopped
    pub(crate) async fn force_stop(&mut self, redirector: &mut Redirector) {
        self.state = WatcherState::Stopping;
        for handle in &mut self.processes {
            if let Some(fd) = handle.stdout_fd() {
                redirector.remove_pipe(fd);
            }
            if let Some(fd) = handle.stderr_fd() {
                redirector.remove_pipe(fd);
            }
            if let Err(err) = handle.stop().await {
                warn!("watcher {} (emergency stop): {}", self.name, err);
            }
        }
        self.state = WatcherState::Stopped;
    }

    /// Reap exited processes and drop their redirections. Returns the
    /// number reaped.
    pub(crate) fn reap(&mut self, redirector: &mut Redirector) -> usize {
        let name = self.name.clone();
        let mut reaped = 0;
        self.processes.retain_mut(|handle| match handle.try_wait() {
            Some(status) => {
                debug!(
                    "watcher {}: reaped pid {} (exit status {})",
                    name,
                    handle.pid(),
                    status
                );
                if let Some(fd) = handle.stdout_fd() {
                    redirector.remove_pipe(fd);
                }
                if let Some(fd) = handle.stderr_fd() {
                    redirector.remove_pipe(fd);
                }
                reaped += 1;
                false
            }
            None => true,
        });

        if reaped > 0 && self.processes.is_empty() && self.state == WatcherState::Running {
            debug!("watcher {}: no processes left, marking stopped", name);
            self.state = WatcherState::Stopped;
        }
        reaped
    }

    /// Advance the watcher's own state machine: reap what exited and settle
    /// lifecycle state. Part of the periodic management cycle.
    pub(crate) async fn manage_processes(&mut self, redirector: &mut Redirector) -> ArbiterResult<()> {
        let reaped = self.reap(redirector);
        if reaped > 0 {
            debug!("watcher {}: managed, {} process(es) reaped", self.name, reaped);
        }
        Ok(())
    }
}
