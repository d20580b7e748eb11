use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tempvoice_lobby::ChannelId,
    tracing::debug,
};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::TempvoiceConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "tempvoice.toml",
    "tempvoice.yaml",
    "tempvoice.yml",
    "tempvoice.json",
];

/// Bot token variables, first non-empty wins.
const TOKEN_VARS: &[&str] = &["DISCORD_TOKEN", "TOKEN"];
/// Comma-separated lobby voice channel ids.
const LOBBY_VAR: &str = "CHANNEL_ID";
/// Comma-separated announcement channel allow-list.
const ANNOUNCE_VAR: &str = "ANNOUNCE_CHANNEL_IDS";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<TempvoiceConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&substitute_env(&raw), path)
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/tempvoice/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tempvoice").map(|d| d.config_dir().to_path_buf())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// `lookup` is usually `|name| std::env::var(name).ok()`. Empty values are
/// ignored so an unset-but-exported variable doesn't wipe the file's value.
pub fn apply_env_overrides(
    config: &mut TempvoiceConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = TOKEN_VARS.iter().find_map(|name| non_empty(name)) {
        debug!("discord token taken from environment");
        config.discord.token = Secret::new(token.trim().to_string());
    }
    if let Some(raw) = non_empty(LOBBY_VAR) {
        config.lobby.lobby_channels = parse_channel_list(LOBBY_VAR, &raw)?;
    }
    if let Some(raw) = non_empty(ANNOUNCE_VAR) {
        config.lobby.announce_channels = parse_channel_list(ANNOUNCE_VAR, &raw)?;
    }
    Ok(())
}

/// Parse `"1, 2,3"` into channel ids, skipping empty segments.
fn parse_channel_list(variable: &str, raw: &str) -> Result<Vec<ChannelId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|source| Error::InvalidChannelId {
                variable: variable.to_string(),
                value: s.to_string(),
                source,
            })
        })
        .collect()
}

fn parse_config(raw: &str, path: &Path) -> Result<TempvoiceConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
