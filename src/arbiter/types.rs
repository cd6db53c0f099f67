/*!
 * Arbiter Types
 * Command names, watcher lifecycle states, and arbitration errors
 */

use crate::process::ProcessError;
use std::fmt;
use thiserror::Error;

/// Arbiter operation result
pub type ArbiterResult<T> = Result<T, ArbiterError>;

/// Arbitration errors
#[derive(Error, Debug, Clone)]
pub enum ArbiterError {
    /// Another exclusive command holds the token. Callers retry or surface
    /// the conflict; body errors are never wrapped in this variant.
    #[error("arbiter is already running {held_by} command")]
    Conflict { held_by: CommandName },

    #[error("unknown watcher: {0}")]
    WatcherNotFound(String),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Stable names of the mutually-exclusive administrative commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    StartWatchers,
    StopWatchers,
    RestartWatchers,
    WatcherStart,
    WatcherStop,
    WatcherRestart,
    ManageWatchers,
}

impl CommandName {
    pub const fn as_str(self) -> &'static str {
        match self {
            CommandName::StartWatchers => "arbiter_start_watchers",
            CommandName::StopWatchers => "arbiter_stop_watchers",
            CommandName::RestartWatchers => "arbiter_restart_watchers",
            CommandName::WatcherStart => "watcher_start",
            CommandName::WatcherStop => "watcher_stop",
            CommandName::WatcherRestart => "watcher_restart",
            CommandName::ManageWatchers => "manage_watchers",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Watcher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Result of a start command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Number of watchers actually started
    Started(usize),
    /// Nothing needed starting; the exclusivity token was never claimed
    AlreadyRunning,
}

/// Result of a stop command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Number of watchers actually stopped
    Stopped(usize),
    /// Nothing needed stopping; the exclusivity token was never claimed
    AlreadyStopped,
}
