//! Configuration loading, env substitution, env overrides and validation.
//!
//! Config files: `tempvoice.toml`, `tempvoice.yaml` or `tempvoice.json`,
//! searched in `./` then `~/.config/tempvoice/`. String values support
//! `${ENV_VAR}` substitution, and a few plain environment variables
//! (`DISCORD_TOKEN`, `CHANNEL_ID`, `ANNOUNCE_CHANNEL_IDS`) override the file.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, find_config_file, load_config},
    schema::{DiscordConfig, TempvoiceConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
