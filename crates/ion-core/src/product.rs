//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface that the binary implements to configure
//! file names, environment overrides and user-facing text.

use std::path::Path;

/// Configuration trait for a CLI product
///
/// The binary implements this trait to define:
/// - Product identity (name, display name)
/// - The entry-point file name and the project workspace directory name
/// - Environment variables used for overrides
/// - Documentation links and post-init instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Name of the configuration script searched for by the locator
    fn config_file_name(&self) -> &'static str;

    /// Name of the workspace directory created under the project root
    fn workspace_dir_name(&self) -> &'static str;

    /// Environment variable that forces a specific JavaScript runtime
    fn runtime_env(&self) -> &'static str;

    /// Environment variable holding the log filter
    fn log_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Generate the "next steps" instructions after a starter file is written
    fn next_steps(&self, config_path: &Path) -> Vec<String>;
}
