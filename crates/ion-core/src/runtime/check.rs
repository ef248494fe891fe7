//! Runtime detection for Bun and Node.js

use super::channel::EvalError;
use crate::product::ProductConfig;
use semver::Version;
use std::fmt;
use std::process::Command;

/// Oldest Node.js release that can strip TypeScript types
pub const NODE_MIN_VERSION: &str = "22.6.0";

/// Supported JavaScript runtimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsRuntime {
    Bun,
    Node,
}

impl JsRuntime {
    pub fn display_name(&self) -> &'static str {
        match self {
            JsRuntime::Bun => "Bun",
            JsRuntime::Node => "Node.js",
        }
    }

    /// Executable name
    pub fn command(&self) -> &'static str {
        match self {
            JsRuntime::Bun => "bun",
            JsRuntime::Node => "node",
        }
    }

    /// Arguments placed before the script path
    pub fn eval_args(&self) -> &'static [&'static str] {
        match self {
            JsRuntime::Bun => &["run"],
            JsRuntime::Node => &[
                "--experimental-strip-types",
                "--no-warnings=ExperimentalWarning",
            ],
        }
    }

    fn parse(value: &str) -> Result<Self, EvalError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bun" => Ok(JsRuntime::Bun),
            "node" | "nodejs" => Ok(JsRuntime::Node),
            _ => Err(EvalError::UnknownRuntime(value.to_string())),
        }
    }
}

impl fmt::Display for JsRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub runtime: JsRuntime,
    pub version: Option<String>,
    pub available: bool,
}

fn probe(runtime: JsRuntime) -> RuntimeInfo {
    let output = Command::new(runtime.command()).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                runtime,
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            runtime,
            version: None,
            available: false,
        },
    }
}

/// Check if Bun is available
pub fn check_bun() -> RuntimeInfo {
    probe(JsRuntime::Bun)
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    probe(JsRuntime::Node)
}

/// Parse version string, handling a leading 'v' (`node --version` prints `v22.6.0`)
pub fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).ok()
}

fn node_supported(info: &RuntimeInfo) -> Result<(), EvalError> {
    let minimum = Version::new(22, 6, 0);
    let version = info.version.as_deref().unwrap_or_default();
    match parse_version(version) {
        Some(v) if v >= minimum => Ok(()),
        // Unparseable versions are given the benefit of the doubt
        None => Ok(()),
        Some(_) => Err(EvalError::UnsupportedRuntime {
            runtime: JsRuntime::Node.display_name(),
            version: version.to_string(),
            minimum: NODE_MIN_VERSION.to_string(),
        }),
    }
}

/// Pick a runtime from probe results. Bun is preferred since it runs
/// TypeScript without flags; `forced` pins one runtime.
pub fn select_runtime(
    forced: Option<&str>,
    bun: &RuntimeInfo,
    node: &RuntimeInfo,
) -> Result<RuntimeInfo, EvalError> {
    let minimum = NODE_MIN_VERSION.to_string();

    if let Some(value) = forced.filter(|v| !v.trim().is_empty()) {
        return match JsRuntime::parse(value)? {
            JsRuntime::Bun if bun.available => Ok(bun.clone()),
            JsRuntime::Node if node.available => node_supported(node).map(|_| node.clone()),
            _ => Err(EvalError::NoRuntime { minimum }),
        };
    }

    if bun.available {
        return Ok(bun.clone());
    }
    if node.available {
        node_supported(node)?;
        return Ok(node.clone());
    }
    Err(EvalError::NoRuntime { minimum })
}

/// Detect the runtime to evaluate configuration with, probing each
/// candidate once.
///
/// `forced` (e.g. a CLI flag) wins over the product's override variable.
pub fn detect_runtime<C: ProductConfig>(
    config: &C,
    forced: Option<&str>,
) -> Result<RuntimeInfo, EvalError> {
    let from_env = std::env::var(config.runtime_env()).ok();
    let forced = forced.or(from_env.as_deref());
    let info = select_runtime(forced, &check_bun(), &check_node())?;
    tracing::debug!(
        "using {} {} to evaluate configuration",
        info.runtime,
        info.version.as_deref().unwrap_or("")
    );
    Ok(info)
}
