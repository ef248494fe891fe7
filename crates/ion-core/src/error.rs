//! Error types for project resolution and starter generation

use crate::runtime::EvalError;
use std::path::PathBuf;
use thiserror::Error;

/// A configuration payload that decoded but did not pass validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("project name is required")]
    MissingName,

    #[error("region is required")]
    MissingRegion,

    #[error("removalPolicy must be one of: remove, retain, retain-all (got \"{0}\")")]
    InvalidRemovalPolicy(String),
}

/// Failure of a single project resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not find {file_name} in {} or any parent directory", .start.display())]
    EntryPointNotFound { file_name: String, start: PathBuf },

    #[error("failed to prepare workspace directory {}: {source}", .path.display())]
    WorkspaceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to evaluate configuration: {0}")]
    EvalSubmit(#[from] EvalError),

    #[error("malformed configuration payload {body:?}: {source}")]
    MalformedPayload {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ResolveError {
    /// The validation failure behind this error, if any
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ResolveError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Failure while writing a starter configuration file
#[derive(Debug, Error)]
pub enum StarterError {
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
