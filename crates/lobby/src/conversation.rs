//! The two-question private exchange that precedes channel creation.
//!
//! ```text
//! AwaitingName ──► LeaveRequested
//!              ├─► TimedOut
//!              └─► NamedChannel(name) ─(channel created)─► AwaitingConsent ──► Yes
//!                                                                        └──► No (also on timeout)
//! ```
//!
//! Each wait is a `tokio::time::timeout` raced against the session's
//! cancellation token; the outcome is always a value, never an error.

use std::{sync::Arc, time::Duration};

use {
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

use crate::{
    PlatformError,
    messages,
    platform::{PrivateChannel, ReplyFilter},
    sanitize::sanitize,
    settings::LobbySettings,
    types::{Category, Member},
};

/// Result of one bounded wait for a private reply.
#[derive(Debug)]
pub enum Reply {
    Message(String),
    TimedOut,
    Failed(PlatformError),
    Cancelled,
}

/// Terminal state of the name question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOutcome {
    /// The member asked not to get a channel.
    LeaveRequested,
    /// Sanitized channel name; may be empty.
    Named(String),
    /// No reply in time, or the exchange could not be delivered.
    TimedOut,
    /// The process is shutting down.
    Cancelled,
}

/// Terminal state of the broadcast-consent question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOutcome {
    Yes,
    /// Explicit "no", timeout, or delivery failure.
    No,
    Cancelled,
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// One member's conversation, scoped to a single lobby join.
pub struct Conversation {
    channel: Box<dyn PrivateChannel>,
    member: Member,
    category: Option<Category>,
    name_timeout: Duration,
    consent_timeout: Duration,
    cancel: CancellationToken,
}

impl Conversation {
    pub fn new(
        channel: Box<dyn PrivateChannel>,
        member: Member,
        category: Option<Category>,
        settings: &LobbySettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            channel,
            member,
            category,
            name_timeout: settings.name_timeout(),
            consent_timeout: settings.consent_timeout(),
            cancel,
        }
    }

    /// Send a message, logging and swallowing any failure.
    pub async fn notify(&self, text: &str) -> bool {
        match self.channel.send(text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %self.member.user_id, error = %e, "failed to send private message");
                false
            },
        }
    }

    async fn wait(&self, timeout: Duration, filter: ReplyFilter) -> Reply {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Reply::Cancelled,
            res = tokio::time::timeout(timeout, self.channel.next_reply(filter)) => match res {
                Err(_) => Reply::TimedOut,
                Ok(Ok(text)) => Reply::Message(text),
                Ok(Err(e)) => Reply::Failed(e),
            },
        }
    }

    /// Ask what the new channel should be called.
    pub async fn ask_name(&self) -> NameOutcome {
        let prompt = messages::name_prompt(&self.member.display_name, self.category.as_ref());
        if !self.notify(&prompt).await {
            return NameOutcome::TimedOut;
        }

        let any_message: ReplyFilter = Arc::new(|_: &str| true);
        match self.wait(self.name_timeout, any_message).await {
            Reply::Message(text) if normalize(&text) == messages::LEAVE_KEYWORD => {
                NameOutcome::LeaveRequested
            },
            Reply::Message(text) => {
                let name = sanitize(&text);
                debug!(user_id = %self.member.user_id, name = %name, "member named channel");
                NameOutcome::Named(name)
            },
            Reply::TimedOut => NameOutcome::TimedOut,
            Reply::Failed(e) => {
                warn!(user_id = %self.member.user_id, error = %e, "failed to collect channel name");
                NameOutcome::TimedOut
            },
            Reply::Cancelled => NameOutcome::Cancelled,
        }
    }

    /// Ask whether the member wants their channel announced.
    pub async fn ask_consent(&self, channel_name: &str) -> ConsentOutcome {
        if !self.notify(&messages::consent_prompt(channel_name)).await {
            return ConsentOutcome::No;
        }

        let filter: ReplyFilter =
            Arc::new(|text: &str| matches!(normalize(text).as_str(), "yes" | "no"));
        match self.wait(self.consent_timeout, filter).await {
            Reply::Message(text) if normalize(&text) == "yes" => ConsentOutcome::Yes,
            Reply::Message(_) | Reply::TimedOut => ConsentOutcome::No,
            Reply::Failed(e) => {
                warn!(user_id = %self.member.user_id, error = %e, "failed to collect consent");
                ConsentOutcome::No
            },
            Reply::Cancelled => ConsentOutcome::Cancelled,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::{
            platform::PrivateMessaging,
            test_support::{FailMode, FakePlatform, Op, member},
            types::ChannelId,
        },
    };

    async fn conversation(platform: &FakePlatform, cancel: CancellationToken) -> Conversation {
        let dm = platform.open_private_channel(&member()).await.unwrap();
        let category = Category {
            id: ChannelId(500),
            name: "Gaming".into(),
        };
        Conversation::new(dm, member(), Some(category), &LobbySettings::default(), cancel)
    }

    #[tokio::test(start_paused = true)]
    async fn name_reply_is_sanitized() {
        let platform = FakePlatform::new();
        platform.reply("Movie Night!!");
        let conv = conversation(&platform, CancellationToken::new()).await;
        assert_eq!(conv.ask_name().await, NameOutcome::Named("Movie Night".into()));
        let dms = platform.dms();
        assert_eq!(dms.len(), 1);
        assert!(dms[0].contains("\"Gaming\" section"));
    }

    #[tokio::test(start_paused = true)]
    async fn leave_is_case_and_whitespace_insensitive() {
        let platform = FakePlatform::new();
        platform.reply("  LeAvE \n");
        let conv = conversation(&platform, CancellationToken::new()).await;
        assert_eq!(conv.ask_name().await, NameOutcome::LeaveRequested);
    }

    #[tokio::test(start_paused = true)]
    async fn silence_times_out_after_name_window() {
        let platform = FakePlatform::new();
        let conv = conversation(&platform, CancellationToken::new()).await;
        let started = tokio::time::Instant::now();
        assert_eq!(conv.ask_name().await, NameOutcome::TimedOut);
        assert_eq!(started.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn undeliverable_prompt_counts_as_timeout() {
        let platform = FakePlatform::new();
        platform.fail(Op::SendDm, FailMode::Remote);
        platform.reply("my channel");
        let conv = conversation(&platform, CancellationToken::new()).await;
        assert_eq!(conv.ask_name().await, NameOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_ends_the_wait() {
        let platform = FakePlatform::new();
        let cancel = CancellationToken::new();
        let conv = conversation(&platform, cancel.clone()).await;
        cancel.cancel();
        assert_eq!(conv.ask_name().await, NameOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn consent_ignores_chatter_until_yes() {
        let platform = FakePlatform::new();
        platform.reply("hmm let me think");
        platform.reply(" YES ");
        let conv = conversation(&platform, CancellationToken::new()).await;
        assert_eq!(conv.ask_consent("Movie Night").await, ConsentOutcome::Yes);
        assert!(platform.dms()[0].contains("\"Movie Night\""));
    }

    #[tokio::test(start_paused = true)]
    async fn consent_no_and_timeout_are_the_same() {
        let platform = FakePlatform::new();
        platform.reply("no");
        let conv = conversation(&platform, CancellationToken::new()).await;
        assert_eq!(conv.ask_consent("x").await, ConsentOutcome::No);

        let started = tokio::time::Instant::now();
        platform.reply("maybe");
        assert_eq!(conv.ask_consent("x").await, ConsentOutcome::No);
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }
}
