//! Record of the voice channels this process created.
//!
//! Only tracked channels are ever deleted automatically. The map sits behind
//! a `std::sync::Mutex` because every operation is a short map update that
//! never spans an `.await`.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Mutex,
    time::Instant,
};

use tracing::debug;

use crate::types::{ChannelId, GuildId};

/// A dynamic channel owned by the tracker until it is deleted.
#[derive(Debug, Clone)]
pub struct TrackedChannel {
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub category: Option<ChannelId>,
    pub name: String,
    pub created_at: Instant,
    deleting: bool,
}

impl TrackedChannel {
    pub fn new(
        channel_id: ChannelId,
        guild_id: GuildId,
        category: Option<ChannelId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            channel_id,
            guild_id,
            category,
            name: name.into(),
            created_at: Instant::now(),
            deleting: false,
        }
    }
}

/// How a deletion started with [`ChannelTracker::begin_delete`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The platform deleted the channel.
    Deleted,
    /// The channel was already gone.
    Gone,
    /// The platform refused; keep tracking so the next emptying retries.
    Failed,
}

/// Concurrency-safe set of channels eligible for automatic deletion.
#[derive(Default)]
pub struct ChannelTracker {
    channels: Mutex<HashMap<ChannelId, TrackedChannel>>,
}

impl ChannelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a channel. Registering an id twice keeps one entry
    /// (the first); returns whether the id was new.
    pub fn register(&self, channel: TrackedChannel) -> bool {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        match channels.entry(channel.channel_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                debug!(channel_id = %channel.channel_id, name = %channel.name, "tracking channel");
                slot.insert(channel);
                true
            },
        }
    }

    /// Stop tracking a channel. No-op for unknown ids; returns whether the id
    /// was tracked.
    pub fn forget(&self, channel_id: ChannelId) -> bool {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels.remove(&channel_id).is_some()
    }

    pub fn is_tracked(&self, channel_id: ChannelId) -> bool {
        let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels.contains_key(&channel_id)
    }

    /// Claim a tracked channel for deletion.
    ///
    /// Returns `false` when the channel is not tracked or another task is
    /// already deleting it. Every `true` must be followed by
    /// [`finish_delete`](Self::finish_delete).
    pub fn begin_delete(&self, channel_id: ChannelId) -> bool {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        match channels.get_mut(&channel_id) {
            Some(channel) if !channel.deleting => {
                channel.deleting = true;
                true
            },
            _ => false,
        }
    }

    /// Settle a claim made by [`begin_delete`](Self::begin_delete).
    pub fn finish_delete(&self, channel_id: ChannelId, outcome: DeleteOutcome) {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        match outcome {
            DeleteOutcome::Deleted | DeleteOutcome::Gone => {
                channels.remove(&channel_id);
            },
            DeleteOutcome::Failed => {
                if let Some(channel) = channels.get_mut(&channel_id) {
                    channel.deleting = false;
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.channels.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tracked channels, oldest first.
    pub fn snapshot(&self) -> Vec<TrackedChannel> {
        let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        let mut list: Vec<_> = channels.values().cloned().collect();
        list.sort_by_key(|c| c.created_at);
        list
    }
}
