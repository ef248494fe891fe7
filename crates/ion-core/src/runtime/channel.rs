//! The evaluation channel capability

use crate::protocol::FramedMessage;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to start or feed an evaluation session
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("no JavaScript runtime found (install Bun from https://bun.sh or Node.js {minimum}+ from https://nodejs.org)")]
    NoRuntime { minimum: String },

    #[error("{runtime} {version} is too old; version {minimum} or newer is required")]
    UnsupportedRuntime {
        runtime: &'static str,
        version: String,
        minimum: String,
    },

    #[error("unknown runtime '{0}' (expected 'bun' or 'node')")]
    UnknownRuntime(String),

    #[error("an evaluation is already running in this session")]
    SessionActive,

    #[error("failed to write evaluation request {}: {source}", .path.display())]
    WriteRequest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {runtime}: {source}")]
    Spawn {
        runtime: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stop {runtime}: {source}")]
    Kill {
        runtime: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// A long-lived interpreter session
///
/// One channel is one exclusive session: callers submit a request and then
/// read messages until [`FramedMessage::SessionDone`].
#[async_trait]
pub trait EvalChannel: Send {
    /// Evaluate `source` with `dir` as the working directory
    async fn submit(&mut self, dir: &Path, source: &str) -> Result<(), EvalError>;

    /// Wait for the next message of the current evaluation.
    ///
    /// Returns [`FramedMessage::SessionDone`] once the evaluation has finished,
    /// and keeps returning it on later calls.
    async fn next_message(&mut self) -> FramedMessage;

    /// Tear down the session
    async fn close(&mut self) -> Result<(), EvalError> {
        Ok(())
    }
}

#[async_trait]
impl<E: EvalChannel + ?Sized> EvalChannel for &mut E {
    async fn submit(&mut self, dir: &Path, source: &str) -> Result<(), EvalError> {
        (**self).submit(dir, source).await
    }

    async fn next_message(&mut self) -> FramedMessage {
        (**self).next_message().await
    }

    async fn close(&mut self) -> Result<(), EvalError> {
        (**self).close().await
    }
}
