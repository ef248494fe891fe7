//! Charm-style init prompts using cliclack

use crate::config::starter::{self, DEFAULT_PROJECT_NAME};
use crate::error::StarterError;
use crate::product::ProductConfig;
use crate::runtime::check;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// CLI arguments for the init command
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Directory to write the configuration file into (defaults to cwd)
    pub directory: Option<PathBuf>,

    /// Project name to put in the starter configuration
    pub name: Option<String>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the init flow with interactive prompts, returning the new file's path
pub async fn run_init<C: ProductConfig>(config: &C, args: InitArgs) -> Result<PathBuf> {
    cliclack::intro(config.display_name())?;

    // Step 1: Resolve target directory
    let dir = select_directory(&args)?;

    // Step 2: Runtime check (advisory; init itself needs no runtime)
    check_runtime(config)?;

    // Step 3: Project name
    let name = select_name(&args)?;

    // Step 4: Write the starter file
    let spinner = cliclack::spinner();
    spinner.start(format!("Writing {}...", config.config_file_name()));

    let path = match starter::create_starter(config, &dir, &name).await {
        Ok(path) => path,
        Err(e @ StarterError::AlreadyExists(_)) => {
            spinner.error("Nothing written");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!(
                "Remove the existing {} or run init in another directory.",
                config.config_file_name()
            );
        }
        Err(e) => {
            spinner.error("Failed");
            return Err(e.into());
        }
    };
    spinner.stop(format!("Created {}", path.display()));

    // Step 5: Show next steps
    print_next_steps(config, &path)?;

    Ok(path)
}

fn select_directory(args: &InitArgs) -> Result<PathBuf> {
    let current_dir = std::env::current_dir()?;

    let path = match &args.directory {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    if !path.is_dir() {
        anyhow::bail!("Directory does not exist: {}", path.display());
    }

    if args.directory.is_some() {
        cliclack::log::info(format!("Using directory: {}", path.display()))?;
    }

    Ok(path)
}

fn check_runtime<C: ProductConfig>(config: &C) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking runtimes...");

    match check::detect_runtime(config, None) {
        Ok(info) => {
            spinner.stop(format!(
                "Detected runtime: {} ({})",
                info.runtime,
                info.version.as_deref().unwrap_or("unknown")
            ));
        }
        Err(e) => {
            spinner.stop("No usable runtime");
            cliclack::log::warning(format!(
                "{}\nThe configuration can be written, but not evaluated until a runtime is installed.",
                e
            ))?;
        }
    }

    Ok(())
}

fn select_name(args: &InitArgs) -> Result<String> {
    if let Some(name) = args.name.as_deref().map(str::trim) {
        if name.is_empty() {
            anyhow::bail!("Project name cannot be empty");
        }
        cliclack::log::info(format!("Using project name: {}", name))?;
        return Ok(name.to_string());
    }

    if args.yes {
        return Ok(DEFAULT_PROJECT_NAME.to_string());
    }

    let input: String = cliclack::input("Project name")
        .placeholder(DEFAULT_PROJECT_NAME)
        .default_input(DEFAULT_PROJECT_NAME)
        .validate(|input: &String| {
            if input.trim().is_empty() {
                Err("Project name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact()?;

    Ok(input.trim().to_string())
}

fn print_next_steps<C: ProductConfig>(config: &C, path: &Path) -> Result<()> {
    let steps = config.next_steps(path);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, console::style(step).cyan());
    }

    cliclack::outro(format!("Docs: {}", config.docs_url()))?;

    Ok(())
}
