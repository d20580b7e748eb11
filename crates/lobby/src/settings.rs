use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ChannelId;

/// Lobby configuration shared by every event task. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LobbySettings {
    /// Voice channels whose join event starts provisioning, in order.
    pub lobby_channels: Vec<ChannelId>,

    /// Text channels allowed to receive announcements, in priority order.
    /// Empty means no allow-list.
    pub announce_channels: Vec<ChannelId>,

    /// How long to wait for the channel name reply (seconds).
    pub name_timeout_secs: u64,

    /// How long to wait for the yes/no broadcast consent (seconds).
    pub consent_timeout_secs: u64,

    /// Used when the requested name sanitizes to nothing.
    pub fallback_channel_name: String,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            lobby_channels: Vec::new(),
            announce_channels: Vec::new(),
            name_timeout_secs: 45,
            consent_timeout_secs: 30,
            fallback_channel_name: "Temporary Channel".into(),
        }
    }
}

impl LobbySettings {
    pub fn is_lobby(&self, channel_id: ChannelId) -> bool {
        self.lobby_channels.contains(&channel_id)
    }

    pub fn name_timeout(&self) -> Duration {
        Duration::from_secs(self.name_timeout_secs)
    }

    pub fn consent_timeout(&self) -> Duration {
        Duration::from_secs(self.consent_timeout_secs)
    }
}
