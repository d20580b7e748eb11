use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[must_use]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake!(
    /// Identifier of any guild channel (voice, text or category).
    ChannelId
);
snowflake!(GuildId);
snowflake!(UserId);

/// A guild member as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    /// Nickname if set, otherwise the username.
    pub display_name: String,
}

/// Category (parent) of a voice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: ChannelId,
    pub name: String,
}

/// Where a member is connected to voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceLocation {
    pub channel_id: ChannelId,
    pub category: Option<Category>,
}

impl VoiceLocation {
    pub fn category_id(&self) -> Option<ChannelId> {
        self.category.as_ref().map(|c| c.id)
    }
}

/// A single voice presence change delivered by the platform adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceChange {
    pub guild_id: GuildId,
    pub member: Member,
    pub old: Option<VoiceLocation>,
    pub new: Option<VoiceLocation>,
}

impl PresenceChange {
    pub fn old_channel(&self) -> Option<ChannelId> {
        self.old.as_ref().map(|l| l.channel_id)
    }

    pub fn new_channel(&self) -> Option<ChannelId> {
        self.new.as_ref().map(|l| l.channel_id)
    }

    /// The member actually changed channel (mute/deafen updates don't count).
    pub fn moved(&self) -> bool {
        self.old_channel() != self.new_channel()
    }
}
