//! Discord event handler for serenity.
//!
//! Records the gateway connection on `ready` and forwards voice state
//! updates to the lobby dispatch loop.

use std::sync::Arc;

use {
    serenity::{
        all::{
            Cache, ChannelId as DiscordChannelId, Context, EventHandler, GatewayIntents,
            GuildId as DiscordGuildId, Ready, VoiceState,
        },
        async_trait,
    },
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use tempvoice_lobby::{Category, ChannelId, GuildId, Member, PresenceChange, UserId, VoiceLocation};

use crate::platform::DiscordPlatform;

/// Handler for Discord gateway events.
pub struct LobbyHandler {
    pub platform: Arc<DiscordPlatform>,
    pub events: mpsc::Sender<PresenceChange>,
}

impl LobbyHandler {
    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_VOICE_STATES
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl EventHandler for LobbyHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
        self.platform.attach(ctx.http.clone(), ctx.cache.clone(), ctx.shard.clone());
    }

    async fn cache_ready(&self, _ctx: Context, guilds: Vec<DiscordGuildId>) {
        debug!(guild_count = guilds.len(), "discord cache ready");
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(change) = presence_change(&ctx.cache, old.as_ref(), &new) else {
            return;
        };
        if !change.moved() {
            return;
        }

        debug!(
            guild_id = %change.guild_id,
            user_id = %change.member.user_id,
            old_channel = ?change.old_channel(),
            new_channel = ?change.new_channel(),
            "voice presence changed"
        );
        if self.events.send(change).await.is_err() {
            warn!("dispatch loop is closed, dropping voice update");
        }
    }
}

/// Build a [`PresenceChange`] from a gateway voice state update.
///
/// Returns `None` for updates outside a guild.
pub(crate) fn presence_change(
    cache: &Cache,
    old: Option<&VoiceState>,
    new: &VoiceState,
) -> Option<PresenceChange> {
    let guild_id = new.guild_id.or_else(|| old.and_then(|state| state.guild_id))?;
    let user_id = UserId(new.user_id.get());

    let display_name = new
        .member
        .as_ref()
        .map(|member| member.display_name().to_string())
        .or_else(|| cache.user(new.user_id).map(|user| user.name.clone()))
        .unwrap_or_else(|| user_id.to_string());

    let locate = |channel: Option<DiscordChannelId>| {
        channel.map(|channel_id| VoiceLocation {
            channel_id: ChannelId(channel_id.get()),
            category: category_of(cache, guild_id, channel_id),
        })
    };

    Some(PresenceChange {
        guild_id: GuildId(guild_id.get()),
        member: Member {
            user_id,
            display_name,
        },
        old: locate(old.and_then(|state| state.channel_id)),
        new: locate(new.channel_id),
    })
}

/// Category of a guild channel, named from the cache.
fn category_of(
    cache: &Cache,
    guild_id: DiscordGuildId,
    channel_id: DiscordChannelId,
) -> Option<Category> {
    let guild = cache.guild(guild_id)?;
    let parent = guild.channels.get(&channel_id)?.parent_id?;
    let name = guild
        .channels
        .get(&parent)
        .map_or_else(|| parent.to_string(), |category| category.name.clone());
    Some(Category {
        id: ChannelId(parent.get()),
        name,
    })
}
