//! Capabilities the orchestrator needs from the chat platform.
//!
//! Adapters implement these over a real gateway connection; the core never
//! sees connection state. Every call returns [`PlatformError::NotFound`] when
//! the target is gone so callers can tell a stale reference from a rejection.
//!
//! [`PlatformError::NotFound`]: crate::PlatformError::NotFound

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Result,
    types::{ChannelId, GuildId, Member, UserId},
};

/// Predicate over the content of an incoming private message.
pub type ReplyFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A one-to-one channel between the bot and a single member.
#[async_trait]
pub trait PrivateChannel: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;

    /// Wait for the member's next non-bot message whose content passes
    /// `filter`, returning its content.
    ///
    /// Waits indefinitely; callers bound it with a timeout and drop the
    /// future to stop listening.
    async fn next_reply(&self, filter: ReplyFilter) -> Result<String>;
}

/// Open (or reuse) private channels with members.
#[async_trait]
pub trait PrivateMessaging: Send + Sync {
    async fn open_private_channel(&self, member: &Member) -> Result<Box<dyn PrivateChannel>>;
}

/// Voice channel management.
#[async_trait]
pub trait VoiceChannels: Send + Sync {
    async fn create_voice_channel(
        &self,
        guild_id: GuildId,
        name: &str,
        category: Option<ChannelId>,
        reason: &str,
    ) -> Result<ChannelId>;

    /// Move a member into `channel`, or disconnect them from voice when `None`.
    async fn move_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        channel: Option<ChannelId>,
    ) -> Result<()>;

    async fn delete_channel(&self, channel_id: ChannelId, reason: &str) -> Result<()>;

    /// Number of members currently connected to a voice channel.
    async fn member_count(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<usize>;
}

/// Kind of a guild channel, as far as announcement resolution cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    Other,
}

/// Snapshot of a guild channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<ChannelId>,
    pub position: u16,
}

/// Text channel lookup and posting.
#[async_trait]
pub trait TextChannels: Send + Sync {
    async fn channel_info(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<ChannelInfo>;

    /// Text channels whose parent is `category`, sorted by position.
    async fn text_channels(
        &self,
        guild_id: GuildId,
        category: Option<ChannelId>,
    ) -> Result<Vec<ChannelInfo>>;

    async fn send_message(&self, channel_id: ChannelId, text: &str) -> Result<()>;
}

/// Everything the orchestrator calls, as one object.
pub trait Platform: PrivateMessaging + VoiceChannels + TextChannels {}

impl<T: PrivateMessaging + VoiceChannels + TextChannels + ?Sized> Platform for T {}
