/*!
 * Process Module
 * Child-process handle seam consumed by watchers
 */

mod handle;
mod types;

// Re-export public API
pub use handle::ProcessHandle;
pub use types::{ProcessError, ProcessResult};
