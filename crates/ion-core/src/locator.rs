//! Upward search for the project entry point

use crate::error::ResolveError;
use std::path::{Path, PathBuf};

/// Walk upwards from `start` until a file named `file_name` is found.
///
/// The search includes `start` itself and stops at the filesystem root.
/// A relative `start` is resolved against the current directory first so the
/// returned path is always absolute.
pub fn find_up(start: &Path, file_name: &str) -> Result<PathBuf, ResolveError> {
    let not_found = || ResolveError::EntryPointNotFound {
        file_name: file_name.to_string(),
        start: start.to_path_buf(),
    };

    let mut current = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|_| not_found())?
            .join(start)
    };

    loop {
        let candidate = current.join(file_name);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(not_found());
        }
    }
}
