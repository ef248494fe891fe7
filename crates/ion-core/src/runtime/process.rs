//! Process-backed evaluation channel
//!
//! Each submitted request is written next to the working directory as an ES
//! module and run with the detected runtime. stdout and stderr are merged
//! line by line; the session is done once both streams close and the
//! process has exited.

use super::channel::{EvalChannel, EvalError};
use super::check::JsRuntime;
use crate::protocol::{FramedMessage, REQUEST_FILE_NAME};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split};
use tokio::process::{Child, ChildStderr, ChildStdout, Command as TokioCommand};
use tracing::{debug, warn};

/// A running evaluation
struct Session {
    child: Child,
    stdout: Option<Split<BufReader<ChildStdout>>>,
    stderr: Option<Split<BufReader<ChildStderr>>>,
}

/// Evaluation channel that runs requests with Bun or Node.js
pub struct ProcessChannel {
    root: PathBuf,
    runtime: JsRuntime,
    session: Option<Session>,
}

impl ProcessChannel {
    /// Create a channel for the project rooted at `root`
    pub fn start(root: &Path, runtime: JsRuntime) -> Result<Self, EvalError> {
        debug!("starting {} channel for {}", runtime, root.display());
        Ok(Self {
            root: root.to_path_buf(),
            runtime,
            session: None,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runtime(&self) -> JsRuntime {
        self.runtime
    }

    /// Wait for the process and drop the session
    async fn finish(&mut self) -> FramedMessage {
        if let Some(mut session) = self.session.take() {
            match session.child.wait().await {
                Ok(status) if status.success() => debug!("evaluation finished"),
                Ok(status) => warn!(
                    "{} exited with code {}",
                    self.runtime,
                    status.code().unwrap_or(-1)
                ),
                Err(e) => warn!("failed to wait for {}: {}", self.runtime, e),
            }
        }
        FramedMessage::SessionDone
    }
}

/// Read one line, closing the reader at end of stream or on an I/O error.
///
/// Lines are decoded lossily; bytes that are not UTF-8 never end the stream.
async fn next_line<R>(reader: &mut Option<Split<R>>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    let segments = reader.as_mut()?;
    match segments.next_segment().await {
        Ok(Some(mut line)) => {
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            Some(String::from_utf8_lossy(&line).into_owned())
        }
        Ok(None) => {
            *reader = None;
            None
        }
        Err(e) => {
            warn!("error reading evaluation output: {}", e);
            *reader = None;
            None
        }
    }
}

/// Map the result of killing a session; a process that already exited is fine
fn kill_outcome(runtime: JsRuntime, result: std::io::Result<()>) -> Result<(), EvalError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {
            debug!("{} already exited", runtime);
            Ok(())
        }
        Err(source) => Err(EvalError::Kill {
            runtime: runtime.display_name(),
            source,
        }),
    }
}

#[async_trait]
impl EvalChannel for ProcessChannel {
    async fn submit(&mut self, dir: &Path, source: &str) -> Result<(), EvalError> {
        if self.session.is_some() {
            return Err(EvalError::SessionActive);
        }

        let script = dir.join(REQUEST_FILE_NAME);
        tokio::fs::write(&script, source)
            .await
            .map_err(|source| EvalError::WriteRequest {
                path: script.clone(),
                source,
            })?;

        let mut child = TokioCommand::new(self.runtime.command())
            .args(self.runtime.eval_args())
            .arg(&script)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EvalError::Spawn {
                runtime: self.runtime.display_name(),
                source,
            })?;

        debug!("submitted {} to {}", script.display(), self.runtime);

        let stdout = child.stdout.take().map(|s| BufReader::new(s).split(b'\n'));
        let stderr = child.stderr.take().map(|s| BufReader::new(s).split(b'\n'));
        self.session = Some(Session {
            child,
            stdout,
            stderr,
        });
        Ok(())
    }

    async fn next_message(&mut self) -> FramedMessage {
        loop {
            let Some(Session { stdout, stderr, .. }) = self.session.as_mut() else {
                return FramedMessage::SessionDone;
            };
            if stdout.is_none() && stderr.is_none() {
                return self.finish().await;
            }

            let line = tokio::select! {
                line = next_line(stdout), if stdout.is_some() => line,
                line = next_line(stderr), if stderr.is_some() => line,
            };

            if let Some(line) = line {
                return FramedMessage::classify(&line);
            }
        }
    }

    async fn close(&mut self) -> Result<(), EvalError> {
        match self.session.take() {
            Some(mut session) => kill_outcome(self.runtime, session.child.kill().await),
            None => Ok(()),
        }
    }
}
