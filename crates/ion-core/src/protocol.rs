//! Line framing between the core and the evaluating runtime
//!
//! The runtime writes everything to its ordinary output streams. A line that
//! starts with [`SENTINEL`] carries a JSON payload; any other line is output
//! from user code. End of session is signalled out of band by the channel.

use crate::config::{self, RawConfigCandidate, ResolvedConfig};
use crate::error::ResolveError;
use crate::runtime::EvalChannel;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// Prefix marking a structured payload line
pub const SENTINEL: &str = "~j";

/// File name the request is written to inside the working directory
pub const REQUEST_FILE_NAME: &str = "eval-config.mjs";

/// One message read from an evaluation session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramedMessage {
    /// A sentinel line, with the sentinel already stripped
    StructuredPayload(String),
    /// Any other line of output
    PlainOutput(String),
    /// The session finished and no further messages will arrive
    SessionDone,
}

impl FramedMessage {
    /// Classify one line of runtime output
    pub fn classify(line: &str) -> Self {
        match line.strip_prefix(SENTINEL) {
            Some(body) => FramedMessage::StructuredPayload(body.to_string()),
            None => FramedMessage::PlainOutput(line.to_string()),
        }
    }
}

/// Module source asking the runtime to evaluate an entry point's `config()`
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    entry_point: PathBuf,
}

impl EvaluationRequest {
    pub fn new(entry_point: &Path) -> Self {
        Self {
            entry_point: entry_point.to_path_buf(),
        }
    }

    /// Import specifier for the entry point
    ///
    /// A `file://` URL works for absolute paths on every platform, including
    /// Windows drive letters. Relative paths fall back to the plain string.
    fn specifier(&self) -> String {
        Url::from_file_path(&self.entry_point)
            .map(String::from)
            .unwrap_or_else(|_| self.entry_point.display().to_string())
    }

    /// Render the module source
    pub fn source(&self) -> String {
        // serde_json string quoting is a valid JS string literal
        let specifier = serde_json::Value::String(self.specifier()).to_string();
        let sentinel = serde_json::Value::String(SENTINEL.to_string()).to_string();
        format!(
            "import mod from {specifier};\n\
             console.log({sentinel} + JSON.stringify(await mod.config()));\n"
        )
    }
}

/// Read messages until the session ends and return the validated configuration.
///
/// Plain output is forwarded to the debug log. A malformed or invalid payload
/// ends the read immediately. When several payloads arrive the last one wins.
/// A session without any payload is validated as an empty candidate.
pub async fn read_config<C>(channel: &mut C) -> Result<ResolvedConfig, ResolveError>
where
    C: EvalChannel + ?Sized,
{
    let mut resolved = None;

    loop {
        match channel.next_message().await {
            FramedMessage::SessionDone => break,
            FramedMessage::PlainOutput(line) => {
                debug!(target: "ion::script", "{}", line);
            }
            FramedMessage::StructuredPayload(body) => {
                let candidate = RawConfigCandidate::decode(&body)
                    .map_err(|source| ResolveError::MalformedPayload { body, source })?;
                resolved = Some(config::validate(candidate)?);
            }
        }
    }

    match resolved {
        Some(config) => Ok(config),
        None => {
            warn!("evaluation finished without a configuration payload");
            Ok(config::validate(RawConfigCandidate::default())?)
        }
    }
}
