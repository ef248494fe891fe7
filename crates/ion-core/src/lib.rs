//! Ion Core - Project configuration resolution
//!
//! This library turns a user-authored `ion.config.ts` into a validated
//! [`ResolvedConfig`]. The configuration script is evaluated by an external
//! JavaScript runtime; the core only speaks a small line protocol with it.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Entry-point lookup, line framing, payload validation
//! - **Layer 2: Evaluation** - The [`EvalChannel`] capability and its process-backed implementation
//! - **Layer 3: Orchestration** - [`ProductConfig`] trait and [`ProjectHandle`] resolution
//! - **Layer 4: CLI/TUI Interface** - Optional cliclack-based init prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based init prompts module
//! - `testing`: Exposes [`runtime::scripted::ScriptedChannel`] outside this crate
//!
//! # Example Usage
//!
//! ```ignore
//! use ion_core::{project, ProductConfig};
//!
//! let start = std::env::current_dir()?;
//! let project = project::resolve_project(&MyConfig, &start, None, "0.1.0").await?;
//! println!("{} in {}", project.config().name(), project.config().region());
//! ```

pub mod config;
pub mod error;
pub mod locator;
pub mod product;
pub mod project;
pub mod protocol;
pub mod runtime;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{RawConfigCandidate, RemovalPolicy, ResolvedConfig};
pub use error::{ResolveError, StarterError, ValidationError};
pub use product::ProductConfig;
pub use project::{resolve_project, ProjectHandle, ProjectLayout, ResolvedProject};
pub use protocol::FramedMessage;
pub use runtime::{EvalChannel, EvalError, JsRuntime, ProcessChannel};

#[cfg(feature = "tui")]
pub use tui::run_init;
