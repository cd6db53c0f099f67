/*!
 * Exclusivity Gate
 * Serializes administrative commands through a single-owner token cell
 */

use super::types::{ArbiterError, ArbiterResult, CommandName};
use log::debug;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

#[derive(Default)]
struct TokenCell {
    holder: Option<CommandName>,
    /// Bumped on every claim and force-clear so a stale guard can never
    /// release a token it no longer owns
    epoch: u64,
}

/// Gate holding the process-wide exclusive-command token.
///
/// At most one command name occupies the cell at any instant. Claiming
/// never blocks: a held token fails the caller immediately with
/// [`ArbiterError::Conflict`] naming the holder. The token stays held
/// across every suspension inside the gated body and is released by guard
/// drop on completion, error, panic, or cancellation.
#[derive(Clone, Default)]
pub struct ExclusiveGate {
    cell: Arc<Mutex<TokenCell>>,
}

impl ExclusiveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the token for `command`, or fail with the holder's name
    pub fn claim(&self, command: CommandName) -> ArbiterResult<GateGuard> {
        let mut cell = self.cell.lock();
        if let Some(held_by) = cell.holder {
            return Err(ArbiterError::Conflict { held_by });
        }
        cell.holder = Some(command);
        cell.epoch += 1;
        debug!("exclusivity token claimed by {}", command);
        Ok(GateGuard {
            cell: Arc::clone(&self.cell),
            epoch: cell.epoch,
        })
    }

    /// Run `body` while holding the token for `command`
    pub async fn run_exclusive<T, F>(&self, command: CommandName, body: F) -> ArbiterResult<T>
    where
        F: Future<Output = ArbiterResult<T>>,
    {
        let _guard = self.claim(command)?;
        body.await
    }

    /// Name of the command currently holding the token, if any
    pub fn holder(&self) -> Option<CommandName> {
        self.cell.lock().holder
    }

    /// Clear the token regardless of holder. Emergency-stop path only.
    pub fn force_clear(&self) {
        let mut cell = self.cell.lock();
        cell.holder = None;
        cell.epoch += 1;
    }
}

/// Releases the exclusivity token when dropped
pub struct GateGuard {
    cell: Arc<Mutex<TokenCell>>,
    epoch: u64,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        let mut cell = self.cell.lock();
        if cell.epoch == self.epoch {
            cell.holder = None;
        }
    }
}
