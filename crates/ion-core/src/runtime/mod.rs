//! JavaScript runtime detection and evaluation channels
//!
//! This module provides:
//! - Runtime detection (Bun, Node.js) with version checks
//! - The [`EvalChannel`] capability used by project resolution
//! - A process-backed channel and an in-memory scripted channel for tests

pub mod channel;
pub mod check;
pub mod process;

#[cfg(any(test, feature = "testing"))]
pub mod scripted;

pub use channel::{EvalChannel, EvalError};
pub use check::{check_bun, check_node, detect_runtime, JsRuntime, RuntimeInfo};
pub use process::ProcessChannel;
