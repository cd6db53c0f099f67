/*!
 * Process Types
 * Error types for process handle operations
 */

use crate::core::types::Pid;
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process errors
#[derive(Error, Debug, Clone)]
pub enum ProcessError {
    #[error("failed to start process {pid}: {reason}")]
    StartFailed { pid: Pid, reason: String },

    #[error("failed to stop process {pid}: {reason}")]
    StopFailed { pid: Pid, reason: String },
}
