/*!
 * Signal Types
 * Supervised signal set, handler actions, and command request shapes
 */

use serde::Serialize;
use thiserror::Error;

/// Signal operation result
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("unknown signal: {0}")]
    UnknownSignal(i32),
}

/// Signals the supervisor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Signal {
    /// Hangup detected on controlling terminal
    Hup = 1,
    /// Interrupt from keyboard (Ctrl+C)
    Int = 2,
    /// Quit from keyboard (Ctrl+\)
    Quit = 3,
    /// Termination signal
    Term = 15,
    /// Child process stopped or terminated
    Chld = 17,
    /// Window resize signal
    Winch = 28,
}

impl Signal {
    /// Convert from signal number
    pub fn from_number(n: i32) -> SignalResult<Self> {
        match n {
            1 => Ok(Signal::Hup),
            2 => Ok(Signal::Int),
            3 => Ok(Signal::Quit),
            15 => Ok(Signal::Term),
            17 => Ok(Signal::Chld),
            28 => Ok(Signal::Winch),
            _ => Err(SignalError::UnknownSignal(n)),
        }
    }

    /// Get signal number
    pub fn number(self) -> i32 {
        self as i32
    }

    /// Canonical name used in log output
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Signal::Hup => "SIG_HUP",
            Signal::Int => "SIG_INT",
            Signal::Quit => "SIG_QUIT",
            Signal::Term => "SIG_TERM",
            Signal::Chld => "SIG_CHLD",
            Signal::Winch => "SIG_WINCH",
        }
    }

    /// Handler for this signal, resolved on the loop thread only.
    ///
    /// A closed static mapping: no dynamic name lookup happens anywhere in
    /// the signal path.
    pub const fn action(self) -> SignalAction {
        match self {
            Signal::Term | Signal::Int | Signal::Quit => SignalAction::Quit,
            Signal::Hup => SignalAction::ReloadGraceful,
            // Reaping belongs to the periodic management cycle
            Signal::Chld | Signal::Winch => SignalAction::Ignore,
        }
    }
}

/// What the loop-thread handler does with a delivered signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Dispatch a "quit" command
    Quit,
    /// Dispatch a "reload" command with graceful=true
    ReloadGraceful,
    /// Log and drop
    Ignore,
}

/// Serialized command request handed to the dispatcher
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest {
    pub command: &'static str,
    pub properties: serde_json::Value,
}

impl CommandRequest {
    pub fn quit() -> Self {
        Self {
            command: "quit",
            properties: serde_json::json!({}),
        }
    }

    pub fn reload_graceful() -> Self {
        Self {
            command: "reload",
            properties: serde_json::json!({ "graceful": true }),
        }
    }
}

/// Command-dispatch entry point of the embedding supervisor.
///
/// Receives JSON-object text such as `{"command":"quit","properties":{}}`;
/// transport and response routing live outside this crate.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, request: &[u8]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_signal_from_number() {
        assert_eq!(Signal::from_number(15).unwrap(), Signal::Term);
        assert_eq!(Signal::from_number(1).unwrap(), Signal::Hup);
        assert_eq!(Signal::from_number(2).unwrap(), Signal::Int);
        assert_eq!(Signal::from_number(99), Err(SignalError::UnknownSignal(99)));
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(Signal::Term.canonical_name(), "SIG_TERM");
        assert_eq!(Signal::Hup.canonical_name(), "SIG_HUP");
        assert_eq!(Signal::Winch.canonical_name(), "SIG_WINCH");
    }

    #[test]
    fn test_action_mapping() {
        assert_eq!(Signal::Term.action(), SignalAction::Quit);
        assert_eq!(Signal::Int.action(), SignalAction::Quit);
        assert_eq!(Signal::Quit.action(), SignalAction::Quit);
        assert_eq!(Signal::Hup.action(), SignalAction::ReloadGraceful);
        assert_eq!(Signal::Chld.action(), SignalAction::Ignore);
        assert_eq!(Signal::Winch.action(), SignalAction::Ignore);
    }

    #[test]
    fn test_command_request_shapes() {
        let quit = serde_json::to_value(CommandRequest::quit()).unwrap();
        assert_eq!(
            quit,
            serde_json::json!({ "command": "quit", "properties": {} })
        );

        let reload = serde_json::to_value(CommandRequest::reload_graceful()).unwrap();
        assert_eq!(
            reload,
            serde_json::json!({ "command": "reload", "properties": { "graceful": true } })
        );
    }
}
