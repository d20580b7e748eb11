//! Lobby platform capabilities backed by serenity's REST client, cache and
//! shard messenger.

use std::{
    collections::HashMap,
    num::NonZeroU64,
    sync::{Arc, RwLock},
};

use {
    async_trait::async_trait,
    serenity::{
        all::{
            Cache, ChannelId as DiscordChannelId, ChannelType, CreateChannel, GuildChannel,
            GuildId as DiscordGuildId, Http, Message, ShardMessenger, UserId as DiscordUserId,
        },
        collector::MessageCollector,
    },
    tracing::debug,
};

use tempvoice_lobby::{
    ChannelId, GuildId, Member, PlatformError, PrivateChannel, PrivateMessaging, Result,
    TextChannels, UserId, VoiceChannels,
    platform::{ChannelInfo, ChannelKind, ReplyFilter},
};

use crate::error::classify;

/// Handles captured from the gateway once the shard is ready.
#[derive(Clone)]
struct Connection {
    http: Arc<Http>,
    cache: Arc<Cache>,
    shard: ShardMessenger,
}

/// Discord implementation of the lobby [`Platform`](tempvoice_lobby::Platform).
///
/// Starts disconnected; [`LobbyHandler`](crate::LobbyHandler) attaches the
/// live connection on every `ready`, so reconnects replace the shard.
#[derive(Default)]
pub struct DiscordPlatform {
    connection: RwLock<Option<Connection>>,
}

impl DiscordPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, http: Arc<Http>, cache: Arc<Cache>, shard: ShardMessenger) {
        let mut slot = self.connection.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Connection { http, cache, shard });
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn connection(&self) -> Result<Connection> {
        self.connection
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| PlatformError::unavailable("discord gateway is not ready"))
    }

    /// All channels of a guild, from the cache when the guild is cached.
    async fn guild_channels(&self, guild_id: GuildId) -> Result<Vec<ChannelInfo>> {
        let conn = self.connection()?;
        let guild = to_guild(guild_id)?;

        let cached = conn
            .cache
            .guild(guild)
            .map(|g| g.channels.values().map(channel_info).collect::<Vec<_>>());
        if let Some(channels) = cached {
            return Ok(channels);
        }

        debug!(guild_id = %guild_id, "guild not cached, fetching channels");
        let channels: HashMap<DiscordChannelId, GuildChannel> = guild
            .channels(&conn.http)
            .await
            .map_err(|e| classify("list guild channels", e))?;
        Ok(channels.values().map(channel_info).collect())
    }
}

pub(crate) fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Voice => ChannelKind::Voice,
        ChannelType::Category => ChannelKind::Category,
        _ => ChannelKind::Other,
    }
}

fn channel_info(channel: &GuildChannel) -> ChannelInfo {
    ChannelInfo {
        id: ChannelId(channel.id.get()),
        name: channel.name.clone(),
        kind: channel_kind(channel.kind),
        parent_id: channel.parent_id.map(|id| ChannelId(id.get())),
        position: channel.position,
    }
}

fn non_zero(id: u64, what: &str) -> Result<NonZeroU64> {
    NonZeroU64::new(id).ok_or_else(|| PlatformError::not_found(format!("{what} 0")))
}

pub(crate) fn to_channel(id: ChannelId) -> Result<DiscordChannelId> {
    non_zero(id.get(), "channel").map(DiscordChannelId::from)
}

pub(crate) fn to_guild(id: GuildId) -> Result<DiscordGuildId> {
    non_zero(id.get(), "guild").map(DiscordGuildId::from)
}

pub(crate) fn to_user(id: UserId) -> Result<DiscordUserId> {
    non_zero(id.get(), "user").map(DiscordUserId::from)
}

/// A DM channel with one member.
struct DirectMessages {
    http: Arc<Http>,
    shard: ShardMessenger,
    channel_id: DiscordChannelId,
    user_id: DiscordUserId,
}

#[async_trait]
impl PrivateChannel for DirectMessages {
    async fn send(&self, text: &str) -> Result<()> {
        self.channel_id
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| classify("send direct message", e))
    }

    async fn next_reply(&self, filter: ReplyFilter) -> Result<String> {
        let message = MessageCollector::new(&self.shard)
            .channel_id(self.channel_id)
            .author_id(self.user_id)
            .filter(move |msg: &Message| !msg.author.bot && filter(&msg.content))
            .next()
            .await
            .ok_or_else(|| PlatformError::unavailable("gateway closed while awaiting a reply"))?;
        Ok(message.content)
    }
}

#[async_trait]
impl PrivateMessaging for DiscordPlatform {
    async fn open_private_channel(&self, member: &Member) -> Result<Box<dyn PrivateChannel>> {
        let conn = self.connection()?;
        let user_id = to_user(member.user_id)?;
        let channel = user_id
            .create_dm_channel((&conn.cache, conn.http.as_ref()))
            .await
            .map_err(|e| classify("open direct message channel", e))?;
        Ok(Box::new(DirectMessages {
            http: conn.http,
            shard: conn.shard,
            channel_id: channel.id,
            user_id,
        }))
    }
}

#[async_trait]
impl VoiceChannels for DiscordPlatform {
    async fn create_voice_channel(
        &self,
        guild_id: GuildId,
        name: &str,
        category: Option<ChannelId>,
        reason: &str,
    ) -> Result<ChannelId> {
        let conn = self.connection()?;
        let mut builder = CreateChannel::new(name)
            .kind(ChannelType::Voice)
            .audit_log_reason(reason);
        if let Some(category) = category {
            builder = builder.category(to_channel(category)?);
        }
        let channel = to_guild(guild_id)?
            .create_channel((&conn.cache, conn.http.as_ref()), builder)
            .await
            .map_err(|e| classify("create voice channel", e))?;
        Ok(ChannelId(channel.id.get()))
    }

    async fn move_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        channel: Option<ChannelId>,
    ) -> Result<()> {
        let conn = self.connection()?;
        let guild = to_guild(guild_id)?;
        let user = to_user(user_id)?;
        let cache_http = (&conn.cache, conn.http.as_ref());
        let moved = match channel {
            Some(channel) => guild.move_member(cache_http, user, to_channel(channel)?).await,
            None => guild.disconnect_member(cache_http, user).await,
        };
        moved
            .map(|_| ())
            .map_err(|e| classify("move member", e))
    }

    async fn delete_channel(&self, channel_id: ChannelId, reason: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.http
            .delete_channel(to_channel(channel_id)?, Some(reason))
            .await
            .map(|_| ())
            .map_err(|e| classify("delete channel", e))
    }

    async fn member_count(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<usize> {
        let conn = self.connection()?;
        let guild = to_guild(guild_id)?;
        let channel = to_channel(channel_id)?;

        let guild = conn
            .cache
            .guild(guild)
            .ok_or_else(|| PlatformError::unavailable(format!("guild {guild_id} is not cached")))?;
        if !guild.channels.contains_key(&channel) {
            return Err(PlatformError::not_found(format!("channel {channel_id}")));
        }
        Ok(guild
            .voice_states
            .values()
            .filter(|state| state.channel_id == Some(channel))
            .count())
    }
}

#[async_trait]
impl TextChannels for DiscordPlatform {
    async fn channel_info(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<ChannelInfo> {
        self.guild_channels(guild_id)
            .await?
            .into_iter()
            .find(|channel| channel.id == channel_id)
            .ok_or_else(|| PlatformError::not_found(format!("channel {channel_id}")))
    }

    async fn text_channels(
        &self,
        guild_id: GuildId,
        category: Option<ChannelId>,
    ) -> Result<Vec<ChannelInfo>> {
        let mut channels: Vec<ChannelInfo> = self
            .guild_channels(guild_id)
            .await?
            .into_iter()
            .filter(|channel| channel.kind == ChannelKind::Text && channel.parent_id == category)
            .collect();
        channels.sort_by_key(|channel| (channel.position, channel.id));
        Ok(channels)
    }

    async fn send_message(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        let conn = self.connection()?;
        to_channel(channel_id)?
            .say(&conn.http, text)
            .await
            .map(|_| ())
            .map_err(|e| classify("send channel message", e))
    }
}
