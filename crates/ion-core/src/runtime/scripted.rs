//! In-memory evaluation channel replaying a fixed message sequence

use super::channel::{EvalChannel, EvalError};
use crate::protocol::FramedMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// A submitted request as seen by [`ScriptedChannel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub dir: PathBuf,
    pub source: String,
}

/// Channel that replays `messages` regardless of what is submitted
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    messages: VecDeque<FramedMessage>,
    submissions: Vec<Submission>,
    reads: usize,
    reject_submit: bool,
    closed: bool,
}

impl ScriptedChannel {
    pub fn new(messages: Vec<FramedMessage>) -> Self {
        Self {
            messages: messages.into(),
            ..Default::default()
        }
    }

    /// A channel whose `submit` fails, as if the runtime could not start
    pub fn rejecting() -> Self {
        Self {
            reject_submit: true,
            ..Default::default()
        }
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Number of `next_message` calls so far
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Scripted messages not yet read
    pub fn remaining(&self) -> usize {
        self.messages.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl EvalChannel for ScriptedChannel {
    async fn submit(&mut self, dir: &Path, source: &str) -> Result<(), EvalError> {
        if self.reject_submit {
            return Err(EvalError::Spawn {
                runtime: "scripted",
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "runtime not installed"),
            });
        }
        self.submissions.push(Submission {
            dir: dir.to_path_buf(),
            source: source.to_string(),
        });
        Ok(())
    }

    async fn next_message(&mut self) -> FramedMessage {
        self.reads += 1;
        self.messages
            .pop_front()
            .unwrap_or(FramedMessage::SessionDone)
    }

    async fn close(&mut self) -> Result<(), EvalError> {
        self.closed = true;
        Ok(())
    }
}
