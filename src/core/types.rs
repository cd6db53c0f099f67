/*!
 * Core Types
 * Common aliases used across the supervisor
 */

use std::os::unix::io::RawFd;

/// OS process ID type
pub type Pid = u32;

/// File descriptor type
pub type Fd = RawFd;
