/*!
 * Shared test doubles: event loop, process handles, sinks, dispatcher
 */
#![allow(dead_code)]

use arbiter_core::core::types::{Fd, Pid};
use arbiter_core::process::{ProcessError, ProcessHandle, ProcessResult};
use arbiter_core::reactor::{
    EventLoop, Interest, ReactorError, ReactorResult, ReadHandler, ScheduledCallback,
};
use arbiter_core::redirect::Sink;
use arbiter_core::signals::{Dispatcher, Emergency};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Event loop double with tornado-like semantics: strict add (fails on a
/// second registration for the same fd), silent remove, and a queue of
/// callbacks scheduled from signal context.
#[derive(Default)]
pub struct FakeLoop {
    handlers: Mutex<HashMap<Fd, Arc<Mutex<ReadHandler>>>>,
    scheduled: Mutex<Vec<ScheduledCallback>>,
    closed: AtomicBool,
    pub add_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
    pub schedule_calls: AtomicUsize,
}

impl FakeLoop {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate an unusable loop: schedule_from_signal starts failing
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn has_handler(&self, fd: Fd) -> bool {
        self.handlers.lock().contains_key(&fd)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Deliver read-readiness for `fd`
    pub fn fire(&self, fd: Fd) {
        let handler = self.handlers.lock().get(&fd).cloned();
        if let Some(handler) = handler {
            (handler.lock())();
        }
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.lock().len()
    }

    /// Run everything queued from signal context, as the loop thread would
    pub fn run_scheduled(&self) -> usize {
        let drained: Vec<ScheduledCallback> = self.scheduled.lock().drain(..).collect();
        let count = drained.len();
        for callback in drained {
            callback();
        }
        count
    }

    /// Register a handler behind the redirector's back, simulating the
    /// drift scenario where the loop already knows the descriptor
    pub fn register_external(&self, fd: Fd) {
        self.handlers
            .lock()
            .insert(fd, Arc::new(Mutex::new(Box::new(|| {}))));
    }
}

impl EventLoop for FakeLoop {
    fn add_handler(&self, fd: Fd, handler: ReadHandler, _interest: Interest) -> ReactorResult<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        let mut handlers = self.handlers.lock();
        if handlers.contains_key(&fd) {
            return Err(ReactorError::AddedTwice(fd));
        }
        handlers.insert(fd, Arc::new(Mutex::new(handler)));
        Ok(())
    }

    fn remove_handler(&self, fd: Fd) {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.handlers.lock().remove(&fd);
    }

    fn schedule_from_signal(&self, callback: ScheduledCallback) -> ReactorResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ReactorError::LoopClosed);
        }
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        self.scheduled.lock().push(callback);
        Ok(())
    }
}

/// Shared observation point into a [`FakeProcess`]
#[derive(Clone, Default)]
pub struct ProcessProbe {
    stopped: Arc<AtomicBool>,
    start_calls: Arc<AtomicUsize>,
    stop_calls: Arc<AtomicUsize>,
    exit_status: Arc<Mutex<Option<i32>>>,
}

impl ProcessProbe {
    pub fn start_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Make the next try_wait report the child exited with `status`
    pub fn set_exited(&self, status: i32) {
        *self.exit_status.lock() = Some(status);
    }
}

/// Process handle double; starts stopped
pub struct FakeProcess {
    pid: Pid,
    probe: ProcessProbe,
    start_delay: Duration,
    fail_start: bool,
    stdout: Option<Fd>,
    stderr: Option<Fd>,
}

impl FakeProcess {
    pub fn new(pid: Pid) -> Self {
        let probe = ProcessProbe::default();
        probe.stopped.store(true, Ordering::SeqCst);
        Self {
            pid,
            probe,
            start_delay: Duration::ZERO,
            fail_start: false,
            stdout: None,
            stderr: None,
        }
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn with_failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn with_stdout_fd(mut self, fd: Fd) -> Self {
        self.stdout = Some(fd);
        self
    }

    pub fn with_stderr_fd(mut self, fd: Fd) -> Self {
        self.stderr = Some(fd);
        self
    }

    pub fn probe(&self) -> ProcessProbe {
        self.probe.clone()
    }
}

impl ProcessHandle for FakeProcess {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn start(&mut self) -> BoxFuture<'_, ProcessResult<()>> {
        let pid = self.pid;
        let probe = self.probe.clone();
        let delay = self.start_delay;
        let fail = self.fail_start;
        async move {
            if fail {
                return Err(ProcessError::StartFailed {
                    pid,
                    reason: "simulated spawn failure".into(),
                });
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            probe.stopped.store(false, Ordering::SeqCst);
            probe.start_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }

    fn stop(&mut self) -> BoxFuture<'_, ProcessResult<()>> {
        let probe = self.probe.clone();
        async move {
            probe.stopped.store(true, Ordering::SeqCst);
            probe.stop_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }

    fn is_stopped(&self) -> bool {
        self.probe.is_stopped()
    }

    fn stdout_fd(&self) -> Option<Fd> {
        self.stdout
    }

    fn stderr_fd(&self) -> Option<Fd> {
        self.stderr
    }

    fn try_wait(&mut self) -> Option<i32> {
        let status = self.probe.exit_status.lock().take();
        if status.is_some() {
            self.probe.stopped.store(true, Ordering::SeqCst);
        }
        status
    }
}

/// Sink recording every write and end-of-stream notification
#[derive(Default)]
pub struct RecordingSink {
    pub writes: Mutex<Vec<(Pid, Vec<u8>)>>,
    pub eofs: Mutex<Vec<Pid>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn written(&self) -> Vec<u8> {
        self.writes
            .lock()
            .iter()
            .flat_map(|(_, data)| data.iter().copied())
            .collect()
    }
}

impl Sink for RecordingSink {
    fn write(&self, pid: Pid, data: &[u8]) {
        self.writes.lock().push((pid, data.to_vec()));
    }

    fn eof(&self, pid: Pid) {
        self.eofs.lock().push(pid);
    }
}

/// Dispatcher recording parsed command requests
#[derive(Default)]
pub struct RecordingDispatcher {
    pub requests: Mutex<Vec<serde_json::Value>>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&self, request: &[u8]) {
        let parsed = serde_json::from_slice(request).expect("dispatcher got invalid JSON");
        self.requests.lock().push(parsed);
    }
}

/// Emergency double that records the invocation instead of exiting
#[derive(Default)]
pub struct FakeEmergency {
    pub calls: AtomicUsize,
}

impl FakeEmergency {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Emergency for FakeEmergency {
    fn fail_fast(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
