/*!
 * Core Module
 * Shared types used across the supervisor
 */

pub mod types;

pub use types::{Fd, Pid};
