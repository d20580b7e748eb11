use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    clap::Subcommand,
    tracing::debug,
};

use tempvoice_config::{
    TempvoiceConfig, apply_env_overrides, find_config_file, load_config,
    validate::{self, Severity},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (file plus environment) as TOML,
    /// with the bot token redacted.
    Show,
    /// Validate the effective configuration and report errors/warnings.
    Check,
}

pub fn handle_config(action: ConfigAction, path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => show(path),
        ConfigAction::Check => check(path),
    }
}

/// Load the configuration the bot would run with.
///
/// An explicit `path` must load; otherwise the standard locations are
/// searched and a missing file falls back to defaults. Environment overrides
/// are applied last. Returns the file that was used, if any.
pub fn load_effective(path: Option<&Path>) -> Result<(TempvoiceConfig, Option<PathBuf>)> {
    let source = path.map(Path::to_path_buf).or_else(find_config_file);
    let mut config = match &source {
        Some(file) => load_config(file)
            .with_context(|| format!("failed to load config from {}", file.display()))?,
        None => {
            debug!("no config file found, using defaults");
            TempvoiceConfig::default()
        },
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())
        .context("invalid environment override")?;
    Ok((config, source))
}

fn show(path: Option<&Path>) -> Result<()> {
    let (config, _) = load_effective(path)?;
    let rendered = config.to_redacted_toml()?;
    print!("{rendered}");
    Ok(())
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(path: Option<&Path>) -> Result<()> {
    let (config, source) = load_effective(path)?;

    if let Some(ref file) = source {
        eprintln!("Checking {}\n", file.display());
    } else {
        eprintln!("No config file found; checking defaults and environment.\n");
    }

    let result = validate::validate(&config);
    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if !result.diagnostics.is_empty() {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}
