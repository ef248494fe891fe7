//! ion CLI - Project configuration for ion stacks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use ion_core::tui::InitArgs;
use ion_core::{project, ProductConfig, ResolvedConfig};
use std::path::{Path, PathBuf};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ion product configuration
#[derive(Clone)]
pub struct IonConfig;

impl ProductConfig for IonConfig {
    fn name(&self) -> &'static str {
        "ion"
    }

    fn display_name(&self) -> &'static str {
        "ion"
    }

    fn config_file_name(&self) -> &'static str {
        "ion.config.ts"
    }

    fn workspace_dir_name(&self) -> &'static str {
        ".ion"
    }

    fn runtime_env(&self) -> &'static str {
        "ION_RUNTIME"
    }

    fn log_env(&self) -> &'static str {
        "ION_LOG"
    }

    fn docs_url(&self) -> &'static str {
        "https://ion.dev/docs"
    }

    fn next_steps(&self, config_path: &Path) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to directory if not current
        if let Some(dir) = config_path.parent() {
            if current.as_deref() != Some(dir) {
                steps.push(format!("cd {}", dir.display()));
            }
        }

        // Step 2: Fill in the config
        steps.push(format!(
            "Set name and region in {}",
            config_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.config_file_name().to_string())
        ));

        // Step 3: Check it resolves
        steps.push(format!("{} config", self.name()));

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "ion")]
#[command(about = "CLI for initializing and resolving ion projects")]
#[command(version)]
pub struct Args {
    /// Show debug logs, including output printed by the config script
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a starter ion.config.ts
    Init(CliInitArgs),
    /// Evaluate ion.config.ts and print the resolved configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct CliInitArgs {
    /// Directory to create the configuration file in
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliInitArgs> for InitArgs {
    fn from(args: CliInitArgs) -> Self {
        InitArgs {
            directory: args.directory,
            name: args.name,
            yes: args.yes,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Parser, Debug, Default)]
pub struct ConfigArgs {
    /// Directory to start searching for ion.config.ts from (defaults to cwd)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// JavaScript runtime to evaluate with (bun or node); overrides ION_RUNTIME
    #[arg(long)]
    pub runtime: Option<String>,
}

fn init_tracing<C: ProductConfig>(config: &C, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env(config.log_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn run_config<C: ProductConfig>(config: &C, args: ConfigArgs) -> Result<()> {
    let start = match args.directory {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    tracing::debug!("searching for {} from {}", config.config_file_name(), start.display());
    let project =
        project::resolve_project(config, &start, args.runtime.as_deref(), CLI_VERSION).await?;

    println!("{}", render(project.config(), project.path_config(), args.format)?);
    Ok(())
}

fn render(config: &ResolvedConfig, path: &Path, format: OutputFormat) -> Result<String> {
    let unset = || "(unset)".dimmed().to_string();
    let or_unset = |value: &str| {
        if value.is_empty() {
            unset()
        } else {
            value.to_string()
        }
    };

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(config)?),
        OutputFormat::Text => Ok([
            format!("{} {}", "Config:".dimmed(), path.display()),
            format!("  {:<14} {}", "name", config.name().green().bold()),
            format!("  {:<14} {}", "region", config.region()),
            format!("  {:<14} {}", "profile", or_unset(config.profile())),
            format!("  {:<14} {}", "stage", or_unset(config.stage())),
            format!("  {:<14} {}", "removalPolicy", config.removal_policy()),
        ]
        .join("\n")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = IonConfig;
    init_tracing(&config, args.verbose)?;

    match args.command {
        Some(Command::Init(init_args)) => {
            let result = ion_core::run_init(&config, init_args.into()).await.map(|_| ());

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Some(Command::Config(config_args)) => run_config(&config, config_args).await,
        None => run_config(&config, ConfigArgs::default()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> ResolvedConfig {
        ion_core::config::validate(ion_core::RawConfigCandidate {
            name: Some("myapp".into()),
            region: Some("us-east-1".into()),
            stage: Some("dev".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_render_json() {
        let out = render(&resolved(), Path::new("/p/ion.config.ts"), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "myapp");
        assert_eq!(value["removalPolicy"], "retain");
        assert_eq!(value["profile"], "");
    }

    #[test]
    fn test_render_yaml() {
        let out = render(&resolved(), Path::new("/p/ion.config.ts"), OutputFormat::Yaml).unwrap();
        assert!(out.contains("name: myapp"));
        assert!(out.contains("removalPolicy: retain"));
    }

    #[test]
    fn test_render_text_marks_unset_fields() {
        colored::control::set_override(false);
        let out = render(&resolved(), Path::new("/p/ion.config.ts"), OutputFormat::Text).unwrap();
        assert!(out.contains("stage          dev"));
        assert!(out.contains("profile        (unset)"));
        assert!(out.contains("removalPolicy  retain"));
    }

    #[test]
    fn test_next_steps_end_with_config_command() {
        let steps = IonConfig.next_steps(Path::new("/somewhere/else/ion.config.ts"));
        assert_eq!(steps.first().map(String::as_str), Some("cd /somewhere/else"));
        assert_eq!(steps.last().map(String::as_str), Some("ion config"));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["ion", "config", "--format", "json", "--runtime", "node"])
            .unwrap();
        match args.command {
            Some(Command::Config(c)) => {
                assert_eq!(c.format, OutputFormat::Json);
                assert_eq!(c.runtime.as_deref(), Some("node"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
