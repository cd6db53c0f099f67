/*!
 * Arbiter
 * Owns the watcher collection, the exclusivity gate, and the redirector
 */

use super::gate::ExclusiveGate;
use super::types::{ArbiterError, ArbiterResult, CommandName, StartOutcome, StopOutcome};
use super::watcher::Watcher;
use crate::reactor::EventLoop;
use crate::redirect::Redirector;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Top-level coordinator of all watchers.
///
/// Every administrative command is serialized through the exclusivity gate;
/// the periodic management cycle runs under its own command name. All state
/// here is confined to the loop thread.
pub struct Arbiter {
    watchers: Vec<Watcher>,
    gate: ExclusiveGate,
    redirector: Redirector,
    warmup_delay: Duration,
    stopping: bool,
}

impl Arbiter {
    pub fn new(event_loop: Arc<dyn EventLoop>) -> Self {
        Self {
            watchers: Vec::new(),
            gate: ExclusiveGate::new(),
            redirector: Redirector::new(event_loop),
            warmup_delay: Duration::ZERO,
            stopping: false,
        }
    }

    #[must_use]
    pub fn with_warmup_delay(mut self, delay: Duration) -> Self {
        self.warmup_delay = delay;
        self
    }

    /// Append a watcher. Iteration order is insertion order, mirroring
    /// configuration order.
    pub fn add_watcher(&mut self, watcher: Watcher) {
        debug!("registered watcher {}", watcher.name());
        self.watchers.push(watcher);
    }

    pub fn watcher(&self, name: &str) -> Option<&Watcher> {
        self.watchers.iter().find(|w| w.name() == name)
    }

    pub fn watcher_mut(&mut self, name: &str) -> Option<&mut Watcher> {
        self.watchers.iter_mut().find(|w| w.name() == name)
    }

    pub fn watchers(&self) -> impl Iterator<Item = &Watcher> {
        self.watchers.iter()
    }

    pub fn gate(&self) -> &ExclusiveGate {
        &self.gate
    }

    pub fn redirector(&self) -> &Redirector {
        &self.redirector
    }

    pub fn redirector_mut(&mut self) -> &mut Redirector {
        &mut self.redirector
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// Start every autostart watcher that is stopped.
    ///
    /// The needs-starting check runs before the gate is claimed: when no
    /// watcher qualifies this returns immediately without ever touching the
    /// token, so concurrent callers cannot observe a spurious conflict.
    pub async fn start_watchers(&mut self) -> ArbiterResult<StartOutcome> {
        if !self.watchers.iter().any(|w| w.autostart() && w.is_stopped()) {
            debug!("start_watchers: all watchers already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let _guard = self.gate.claim(CommandName::StartWatchers)?;
        let started = self.start_watchers_inner().await?;
        Ok(StartOutcome::Started(started))
    }

    /// Stop every watcher that is running. Same pre-gate check, symmetric
    /// to [`start_watchers`](Self::start_watchers).
    pub async fn stop_watchers(&mut self) -> ArbiterResult<StopOutcome> {
        if self.watchers.iter().all(|w| w.is_stopped()) {
            debug!("stop_watchers: all watchers already stopped");
            return Ok(StopOutcome::AlreadyStopped);
        }

        let _guard = self.gate.claim(CommandName::StopWatchers)?;
        let stopped = self.stop_watchers_inner().await?;
        Ok(StopOutcome::Stopped(stopped))
    }

    /// Stop then start all watchers under one token claim
    pub async fn restart_watchers(&mut self) -> ArbiterResult<usize> {
        let _guard = self.gate.claim(CommandName::RestartWatchers)?;
        self.stop_watchers_inner().await?;
        self.start_watchers_inner().await
    }

    /// Start one watcher by name. No-op without claiming the token when it
    /// is already running.
    pub async fn start_watcher(&mut self, name: &str) -> ArbiterResult<StartOutcome> {
        let index = self.watcher_index(name)?;
        if !self.watchers[index].is_stopped() {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let _guard = self.gate.claim(CommandName::WatcherStart)?;
        let Self {
            watchers,
            redirector,
            ..
        } = self;
        watchers[index].start(redirector).await?;
        Ok(StartOutcome::Started(1))
    }

    /// Stop one watcher by name. No-op without claiming the token when it
    /// is already stopped.
    pub async fn stop_watcher(&mut self, name: &str) -> ArbiterResult<StopOutcome> {
        let index = self.watcher_index(name)?;
        if self.watchers[index].is_stopped() {
            return Ok(StopOutcome::AlreadyStopped);
        }

        let _guard = self.gate.claim(CommandName::WatcherStop)?;
        let Self {
            watchers,
            redirector,
            ..
        } = self;
        watchers[index].stop(redirector).await?;
        Ok(StopOutcome::Stopped(1))
    }

    /// Restart one watcher by name: stop if running, then start it again
    /// regardless of autostart
    pub async fn restart_watcher(&mut self, name: &str) -> ArbiterResult<()> {
        let index = self.watcher_index(name)?;

        let _guard = self.gate.claim(CommandName::WatcherRestart)?;
        let Self {
            watchers,
            redirector,
            ..
        } = self;
        watchers[index].stop(redirector).await?;
        watchers[index].start(redirector).await?;
        Ok(())
    }

    /// Periodic management cycle: reap exited processes, advance each
    /// watcher's state machine, then bring stopped on-demand watchers back
    /// up.
    ///
    /// A complete no-op while the arbiter is stopping. The on-demand
    /// restart is awaited in place so the token is not released while the
    /// restart is still in flight.
    pub async fn manage_watchers(&mut self) -> ArbiterResult<()> {
        if self.stopping {
            return Ok(());
        }

        let _guard = self.gate.claim(CommandName::ManageWatchers)?;

        let Self {
            watchers,
            redirector,
            ..
        } = self;
        for watcher in watchers.iter_mut() {
            watcher.reap(redirector);
        }
        for watcher in watchers.iter_mut() {
            watcher.manage_processes(redirector).await?;
        }

        if self
            .watchers
            .iter()
            .any(|w| w.on_demand() && w.is_stopped())
        {
            self.start_watchers_inner().await?;
        }
        Ok(())
    }

    /// Reap exited processes across all watchers. Returns the number
    /// reaped.
    pub fn reap_processes(&mut self) -> usize {
        let Self {
            watchers,
            redirector,
            ..
        } = self;
        watchers.iter_mut().map(|w| w.reap(redirector)).sum()
    }

    /// Graceful shutdown: mark stopping, stop all watchers, drop every
    /// stream registration
    pub async fn stop(&mut self) -> ArbiterResult<StopOutcome> {
        self.stopping = true;
        let outcome = self.stop_watchers().await?;
        self.redirector.stop();
        info!("arbiter stopped");
        Ok(outcome)
    }

    /// Force-terminate all watchers regardless of the token's state.
    ///
    /// The only sanctioned way to cut short an in-flight exclusive
    /// operation; the token is left cleared afterward.
    pub async fn emergency_stop(&mut self) {
        self.stopping = true;
        let Self {
            watchers,
            redirector,
            ..
        } = self;
        for watcher in watchers.iter_mut() {
            watcher.force_stop(redirector).await;
        }
        self.redirector.stop();
        self.gate.force_clear();
        info!("arbiter emergency-stopped");
    }

    async fn start_watchers_inner(&mut self) -> ArbiterResult<usize> {
        let warmup_delay = self.warmup_delay;
        let Self {
            watchers,
            redirector,
            ..
        } = self;

        let mut started = 0;
        for watcher in watchers.iter_mut() {
            if watcher.autostart() && watcher.is_stopped() {
                watcher.start(redirector).await?;
                tokio::time::sleep(warmup_delay).await;
                started += 1;
            }
        }
        if started == 0 {
            debug!("start_watchers: nothing to do");
        }
        Ok(started)
    }

    /// Stops in reverse configuration order
    async fn stop_watchers_inner(&mut self) -> ArbiterResult<usize> {
        let Self {
            watchers,
            redirector,
            ..
        } = self;

        let mut stopped = 0;
        for watcher in watchers.iter_mut().rev() {
            if !watcher.is_stopped() {
                watcher.stop(redirector).await?;
                stopped += 1;
            }
        }
        Ok(stopped)
    }

    fn watcher_index(&self, name: &str) -> ArbiterResult<usize> {
        self.watchers
            .iter()
            .position(|w| w.name() == name)
            .ok_or_else(|| ArbiterError::WatcherNotFound(name.to_string()))
    }
}
