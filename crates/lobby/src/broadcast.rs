//! Announcement of a new voice channel in a text channel of the same category.

use tracing::{debug, warn};

use crate::{
    PlatformError, messages,
    platform::{ChannelKind, Platform},
    types::{ChannelId, GuildId},
};

/// Text channel names preferred for announcements (compared lowercased).
pub const PREFERRED_NAMES: &[&str] = &["general", "chat", "voice-text"];

/// What happened to an announcement request.
#[derive(Debug)]
pub enum Announcement {
    Posted(ChannelId),
    /// No eligible text channel under the category.
    NoTarget,
    Failed(PlatformError),
}

/// Pick the text channel an announcement for `category` goes to.
///
/// Rules, first match wins: an allow-listed text channel under the category
/// (allow-list order), a preferred-name text channel under the category
/// (lowest position), then any text channel under the category. An
/// allow-listed channel that cannot be looked up is skipped.
pub async fn resolve_target(
    platform: &dyn Platform,
    guild_id: GuildId,
    category: Option<ChannelId>,
    allowlist: &[ChannelId],
) -> Result<Option<ChannelId>, PlatformError> {
    for &candidate in allowlist {
        match platform.channel_info(guild_id, candidate).await {
            Ok(info) if info.kind == ChannelKind::Text && info.parent_id == category => {
                return Ok(Some(info.id));
            },
            Ok(_) => {},
            Err(e) if e.is_not_found() => {
                debug!(channel_id = %candidate, "allow-listed announcement channel not found");
            },
            Err(e) => {
                warn!(channel_id = %candidate, error = %e, "skipping allow-listed announcement channel");
            },
        }
    }

    let text_channels = platform.text_channels(guild_id, category).await?;
    let preferred = text_channels
        .iter()
        .filter(|c| PREFERRED_NAMES.contains(&c.name.to_lowercase().as_str()))
        .min_by_key(|c| c.position);
    let fallback = text_channels.iter().min_by_key(|c| c.position);
    Ok(preferred.or(fallback).map(|c| c.id))
}

/// Resolve the target and post the announcement there.
pub async fn announce(
    platform: &dyn Platform,
    guild_id: GuildId,
    category: Option<ChannelId>,
    allowlist: &[ChannelId],
    display_name: &str,
    channel_name: &str,
) -> Announcement {
    let target = match resolve_target(platform, guild_id, category, allowlist).await {
        Ok(Some(target)) => target,
        Ok(None) => {
            debug!(%guild_id, category = ?category, "no announcement channel in category");
            return Announcement::NoTarget;
        },
        Err(e) => {
            warn!(%guild_id, error = %e, "failed to resolve announcement channel");
            return Announcement::Failed(e);
        },
    };

    let text = messages::announcement(display_name, channel_name);
    match platform.send_message(target, &text).await {
        Ok(()) => Announcement::Posted(target),
        Err(e) => {
            warn!(channel_id = %target, error = %e, "failed to post announcement");
            Announcement::Failed(e)
        },
    }
}
