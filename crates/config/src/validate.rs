//! Semantic checks on a loaded configuration.

use {secrecy::ExposeSecret, tempvoice_lobby::sanitize::sanitize};

use crate::schema::TempvoiceConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "lobby.lobby_channels"
    pub path: &'static str,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path,
            message: message.into(),
        });
    }
}

/// Check that a config can actually run the bot.
pub fn validate(config: &TempvoiceConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let lobby = &config.lobby;

    if config.discord.token.expose_secret().trim().is_empty() {
        result.push(
            Severity::Error,
            "discord.token",
            "bot token is required (set it in the config file or DISCORD_TOKEN)",
        );
    }
    if config.discord.event_buffer == 0 {
        result.push(Severity::Error, "discord.event_buffer", "must be at least 1");
    }
    if lobby.lobby_channels.is_empty() {
        result.push(
            Severity::Error,
            "lobby.lobby_channels",
            "at least one lobby voice channel is required (or CHANNEL_ID)",
        );
    }
    if lobby.name_timeout_secs == 0 {
        result.push(Severity::Error, "lobby.name_timeout_secs", "must be greater than 0");
    }
    if lobby.consent_timeout_secs == 0 {
        result.push(
            Severity::Error,
            "lobby.consent_timeout_secs",
            "must be greater than 0",
        );
    }
    if sanitize(&lobby.fallback_channel_name).is_empty() {
        result.push(
            Severity::Error,
            "lobby.fallback_channel_name",
            "must contain at least one letter, digit, space, '_' or '-'",
        );
    } else if sanitize(&lobby.fallback_channel_name) != lobby.fallback_channel_name {
        result.push(
            Severity::Warning,
            "lobby.fallback_channel_name",
            format!(
                "will be used as {:?}",
                sanitize(&lobby.fallback_channel_name)
            ),
        );
    }

    for id in &lobby.announce_channels {
        if lobby.lobby_channels.contains(id) {
            result.push(
                Severity::Warning,
                "lobby.announce_channels",
                format!("{id} is also a lobby channel and can never receive announcements"),
            );
        }
    }
    let mut seen = Vec::with_capacity(lobby.lobby_channels.len());
    for id in &lobby.lobby_channels {
        if seen.contains(id) {
            result.push(
                Severity::Warning,
                "lobby.lobby_channels",
                format!("{id} is listed more than once"),
            );
        }
        seen.push(*id);
    }
    if lobby
        .lobby_channels
        .iter()
        .chain(&lobby.announce_channels)
        .any(|id| id.get() == 0)
    {
        result.push(Severity::Error, "lobby", "channel ids must be non-zero");
    }

    result
}
