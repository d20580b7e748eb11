//! Temporary voice channel orchestration.
//!
//! Members joining a configured lobby voice channel are asked (over DM) what
//! to call their own channel, get moved into it, and may have their presence
//! announced in a text channel. Channels created this way are tracked and
//! deleted once they empty; every other channel is left alone.
//!
//! The crate only talks to the chat platform through the async traits in
//! [`platform`], so the Discord adapter lives in its own crate.

pub mod broadcast;
pub mod conversation;
pub mod error;
pub mod messages;
pub mod orchestrator;
pub mod platform;
pub mod sanitize;
pub mod settings;
pub mod tracker;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use {
    error::{PlatformError, Result},
    orchestrator::Orchestrator,
    platform::{Platform, PrivateChannel, PrivateMessaging, TextChannels, VoiceChannels},
    settings::LobbySettings,
    tracker::ChannelTracker,
    types::{Category, ChannelId, GuildId, Member, PresenceChange, UserId, VoiceLocation},
};
