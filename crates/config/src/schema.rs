use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tempvoice_lobby::LobbySettings,
};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TempvoiceConfig {
    pub discord: DiscordConfig,
    pub lobby: LobbySettings,
}

impl TempvoiceConfig {
    /// Copy with the bot token masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.discord.token.expose_secret().is_empty() {
            copy.discord.token = Secret::new("[REDACTED]".into());
        }
        copy
    }

    /// Render the redacted config as TOML.
    pub fn to_redacted_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(&self.redacted())
            .map_err(|e| crate::Error::Serialize(e.to_string()))
    }
}

/// Discord connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Capacity of the queue between the gateway handler and the dispatch loop.
    pub event_buffer: usize,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("event_buffer", &self.event_buffer)
            .finish()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            event_buffer: 256,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, tempvoice_lobby::ChannelId};

    #[test]
    fn default_config() {
        let cfg = TempvoiceConfig::default();
        assert!(cfg.discord.token.expose_secret().is_empty());
        assert_eq!(cfg.discord.event_buffer, 256);
        assert_eq!(cfg.lobby.name_timeout_secs, 45);
        assert_eq!(cfg.lobby.consent_timeout_secs, 30);
    }

    #[test]
    fn deserialize_from_toml() {
        let raw = r#"
            [discord]
            token = "abc.def"

            [lobby]
            lobby_channels = [111, 222]
            announce_channels = [333]
            consent_timeout_secs = 10
        "#;
        let cfg: TempvoiceConfig = toml::from_str(raw).unwrap();
        assert_eq!(cfg.discord.token.expose_secret(), "abc.def");
        assert_eq!(cfg.lobby.lobby_channels, vec![ChannelId(111), ChannelId(222)]);
        assert_eq!(cfg.lobby.announce_channels, vec![ChannelId(333)]);
        assert_eq!(cfg.lobby.consent_timeout_secs, 10);
        // defaults for unspecified fields
        assert_eq!(cfg.lobby.name_timeout_secs, 45);
    }

    #[test]
    fn debug_never_prints_token() {
        let cfg = DiscordConfig {
            token: Secret::new("super-secret".into()),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }

    #[test]
    fn redacted_masks_token_only_when_set() {
        let mut cfg = TempvoiceConfig::default();
        assert_eq!(cfg.redacted().discord.token.expose_secret(), "");
        cfg.discord.token = Secret::new("tok".into());
        assert_eq!(cfg.redacted().discord.token.expose_secret(), "[REDACTED]");
        assert_eq!(cfg.discord.token.expose_secret(), "tok");
    }

    #[test]
    fn redacted_toml_round_trips_settings() {
        let mut cfg = TempvoiceConfig::default();
        cfg.discord.token = Secret::new("tok".into());
        cfg.lobby.lobby_channels = vec![ChannelId(42)];

        let rendered = cfg.to_redacted_toml().unwrap();
        assert!(!rendered.contains("\"tok\""));
        assert!(rendered.contains("[REDACTED]"));

        let back: TempvoiceConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(back.lobby.lobby_channels, vec![ChannelId(42)]);
    }
}
