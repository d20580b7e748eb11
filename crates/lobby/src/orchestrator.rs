//! Dispatch loop and per-event handling.
//!
//! Every presence change runs in its own task. A task has two independent
//! branches: the join branch (lobby → conversation → new channel) and the
//! cleanup branch (the channel the member left, if tracked and now empty, is
//! deleted). Remote failures end the branch they happen in and nothing else.

use std::sync::Arc;

use {
    tokio::{sync::mpsc, task::JoinSet},
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{
    broadcast::{self, Announcement},
    conversation::{ConsentOutcome, Conversation, NameOutcome},
    messages,
    platform::Platform,
    sanitize::sanitize,
    settings::LobbySettings,
    tracker::{ChannelTracker, DeleteOutcome, TrackedChannel},
    types::{ChannelId, GuildId, PresenceChange, VoiceLocation},
};

pub struct Orchestrator {
    platform: Arc<dyn Platform>,
    tracker: Arc<ChannelTracker>,
    settings: Arc<LobbySettings>,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        platform: Arc<dyn Platform>,
        tracker: Arc<ChannelTracker>,
        settings: Arc<LobbySettings>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            platform,
            tracker,
            settings,
            cancel,
        }
    }

    pub fn tracker(&self) -> &Arc<ChannelTracker> {
        &self.tracker
    }

    /// Consume presence changes until the sender closes or the token is
    /// cancelled, spawning one task per event. Waits for in-flight tasks
    /// before returning.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<PresenceChange>) {
        let mut tasks = JoinSet::new();
        info!(
            lobbies = self.settings.lobby_channels.len(),
            "presence dispatch loop started"
        );

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "presence task failed");
                    }
                },
                event = events.recv() => match event {
                    Some(event) => {
                        let this = Arc::clone(&self);
                        tasks.spawn(async move { this.handle(event).await });
                    },
                    None => break,
                },
            }
        }

        debug!(in_flight = tasks.len(), "draining presence tasks");
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "presence task failed");
            }
        }
        info!(tracked = self.tracker.len(), "presence dispatch loop stopped");
    }

    /// Handle a single presence change: both branches, concurrently.
    pub async fn handle(&self, event: PresenceChange) {
        if !event.moved() {
            return;
        }
        tokio::join!(self.join_branch(&event), self.cleanup_branch(&event));
    }

    async fn join_branch(&self, event: &PresenceChange) {
        let Some(lobby) = event
            .new
            .as_ref()
            .filter(|l| self.settings.is_lobby(l.channel_id))
        else {
            return;
        };
        let member = &event.member;
        info!(
            guild_id = %event.guild_id,
            user_id = %member.user_id,
            lobby = %lobby.channel_id,
            "member joined lobby"
        );

        let dm = match self.platform.open_private_channel(member).await {
            Ok(dm) => dm,
            Err(e) => {
                warn!(user_id = %member.user_id, error = %e, "failed to open private channel");
                return;
            },
        };
        let conversation = Conversation::new(
            dm,
            member.clone(),
            lobby.category.clone(),
            &self.settings,
            self.cancel.child_token(),
        );

        let name = match conversation.ask_name().await {
            NameOutcome::Named(name) => name,
            NameOutcome::LeaveRequested => {
                conversation.notify(messages::LEFT).await;
                self.disconnect(event).await;
                return;
            },
            NameOutcome::TimedOut => {
                conversation.notify(messages::TIMED_OUT).await;
                self.disconnect(event).await;
                return;
            },
            NameOutcome::Cancelled => return,
        };
        let name = if name.is_empty() {
            info!(user_id = %member.user_id, "requested name is empty, using fallback");
            sanitize(&self.settings.fallback_channel_name)
        } else {
            name
        };

        let Some(channel_id) = self.provision(event, lobby, &name).await else {
            conversation.notify(messages::CREATE_FAILED).await;
            return;
        };
        conversation.notify(&messages::moved(&name)).await;

        match conversation.ask_consent(&name).await {
            ConsentOutcome::Yes => {
                let announcement = broadcast::announce(
                    &*self.platform,
                    event.guild_id,
                    lobby.category_id(),
                    &self.settings.announce_channels,
                    &member.display_name,
                    &name,
                )
                .await;
                let reply = match announcement {
                    Announcement::Posted(target) => {
                        info!(channel_id = %channel_id, target = %target, "announced channel");
                        messages::POSTED
                    },
                    Announcement::NoTarget => messages::NO_TEXT_CHANNEL,
                    Announcement::Failed(_) => messages::POST_FAILED,
                };
                conversation.notify(reply).await;
            },
            ConsentOutcome::No => {
                conversation.notify(messages::DECLINED).await;
            },
            ConsentOutcome::Cancelled => {},
        }
    }

    /// Create the channel, track it, and move the member in. `None` when any
    /// step fails; an already-created channel stays tracked.
    async fn provision(
        &self,
        event: &PresenceChange,
        lobby: &VoiceLocation,
        name: &str,
    ) -> Option<ChannelId> {
        let guild_id = event.guild_id;
        let user_id = event.member.user_id;
        let category = lobby.category_id();

        let channel_id = match self
            .platform
            .create_voice_channel(guild_id, name, category, messages::CREATE_REASON)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(%guild_id, %user_id, error = %e, "failed to create voice channel");
                return None;
            },
        };
        self.tracker
            .register(TrackedChannel::new(channel_id, guild_id, category, name));

        if let Err(e) = self
            .platform
            .move_member(guild_id, user_id, Some(channel_id))
            .await
        {
            warn!(%guild_id, %user_id, %channel_id, error = %e, "failed to move member");
            return None;
        }
        info!(%guild_id, %user_id, %channel_id, name, "moved member to new voice channel");
        Some(channel_id)
    }

    async fn disconnect(&self, event: &PresenceChange) {
        let user_id = event.member.user_id;
        if let Err(e) = self.platform.move_member(event.guild_id, user_id, None).await {
            warn!(%user_id, error = %e, "failed to disconnect member");
        }
    }

    async fn cleanup_branch(&self, event: &PresenceChange) {
        let Some(old) = event.old_channel() else {
            return;
        };
        if !self.tracker.is_tracked(old) {
            return;
        }

        match self.platform.member_count(event.guild_id, old).await {
            Ok(0) => self.reclaim(event.guild_id, old).await,
            Ok(members) => debug!(channel_id = %old, members, "dynamic channel still in use"),
            Err(e) if e.is_not_found() => {
                debug!(channel_id = %old, "dynamic channel already gone");
                self.tracker.forget(old);
            },
            Err(e) => warn!(channel_id = %old, error = %e, "failed to read member count"),
        }
    }

    async fn reclaim(&self, guild_id: GuildId, channel_id: ChannelId) {
        if !self.tracker.begin_delete(channel_id) {
            return;
        }
        let outcome = match self
            .platform
            .delete_channel(channel_id, messages::DELETE_REASON)
            .await
        {
            Ok(()) => {
                info!(%guild_id, %channel_id, "deleted empty voice channel");
                DeleteOutcome::Deleted
            },
            Err(e) if e.is_not_found() => {
                debug!(%channel_id, "voice channel was already deleted");
                DeleteOutcome::Gone
            },
            Err(e) => {
                warn!(%channel_id, error = %e, "failed to delete voice channel");
                DeleteOutcome::Failed
            },
        };
        self.tracker.finish_delete(channel_id, outcome);
    }
}
