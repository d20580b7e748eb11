//! Recording in-memory platform for tests. No network, no real clock.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use {
    async_trait::async_trait,
    tokio::sync::{Mutex as AsyncMutex, mpsc},
};

use crate::{
    PlatformError, Result,
    platform::{
        ChannelInfo, ChannelKind, PrivateChannel, PrivateMessaging, ReplyFilter, TextChannels,
        VoiceChannels,
    },
    types::{ChannelId, GuildId, Member, UserId},
};

/// Remote operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    OpenDm,
    SendDm,
    Create,
    Move,
    Delete,
    Post,
    MemberCount,
    ChannelInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    Remote,
    NotFound,
}

/// Side-effecting calls, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        id: ChannelId,
        name: String,
        category: Option<ChannelId>,
    },
    Move {
        user: UserId,
        to: Option<ChannelId>,
    },
    Delete {
        channel: ChannelId,
        reason: String,
    },
    Post {
        channel: ChannelId,
        text: String,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("injected failure")]
pub struct Injected;

pub struct FakePlatform {
    calls: Mutex<Vec<Call>>,
    dm_sent: Arc<Mutex<Vec<String>>>,
    dm_tx: mpsc::UnboundedSender<String>,
    dm_rx: Arc<AsyncMutex<mpsc::UnboundedReceiver<String>>>,
    channels: Mutex<HashMap<ChannelId, ChannelInfo>>,
    occupancy: Mutex<HashMap<ChannelId, usize>>,
    failures: Mutex<HashMap<Op, FailMode>>,
    member_count_calls: Mutex<HashSet<ChannelId>>,
    next_id: AtomicU64,
}

impl Default for FakePlatform {
    fn default() -> Self {
        let (dm_tx, dm_rx) = mpsc::unbounded_channel();
        Self {
            calls: Mutex::new(Vec::new()),
            dm_sent: Arc::new(Mutex::new(Vec::new())),
            dm_tx,
            dm_rx: Arc::new(AsyncMutex::new(dm_rx)),
            channels: Mutex::new(HashMap::new()),
            occupancy: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            member_count_calls: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(1000),
        }
    }
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a DM from the member.
    pub fn reply(&self, text: &str) {
        let _ = self.dm_tx.send(text.to_string());
    }

    pub fn fail(&self, op: Op, mode: FailMode) {
        self.failures.lock().unwrap().insert(op, mode);
    }

    pub fn add_channel(&self, id: u64, name: &str, kind: ChannelKind, parent: Option<u64>, position: u16) {
        self.channels.lock().unwrap().insert(ChannelId(id), ChannelInfo {
            id: ChannelId(id),
            name: name.to_string(),
            kind,
            parent_id: parent.map(ChannelId),
            position,
        });
    }

    pub fn set_members(&self, channel: ChannelId, count: usize) {
        self.occupancy.lock().unwrap().insert(channel, count);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn dms(&self) -> Vec<String> {
        self.dm_sent.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<ChannelId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn moves(&self) -> Vec<Option<ChannelId>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Move { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<ChannelId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete { channel, .. } => Some(channel),
                _ => None,
            })
            .collect()
    }

    pub fn posts(&self) -> Vec<(ChannelId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Post { channel, text } => Some((channel, text)),
                _ => None,
            })
            .collect()
    }

    pub fn counted(&self, channel: ChannelId) -> bool {
        self.member_count_calls.lock().unwrap().contains(&channel)
    }

    fn check(&self, op: Op) -> Result<()> {
        match self.failures.lock().unwrap().get(&op) {
            None => Ok(()),
            Some(FailMode::Remote) => Err(PlatformError::remote(format!("{op:?}"), Injected)),
            Some(FailMode::NotFound) => Err(PlatformError::not_found(format!("{op:?}"))),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct FakeDm {
    sent: Arc<Mutex<Vec<String>>>,
    replies: Arc<AsyncMutex<mpsc::UnboundedReceiver<String>>>,
    fail_send: Option<FailMode>,
}

#[async_trait]
impl PrivateChannel for FakeDm {
    async fn send(&self, text: &str) -> Result<()> {
        if self.fail_send.is_some() {
            return Err(PlatformError::remote("send dm", Injected));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn next_reply(&self, filter: ReplyFilter) -> Result<String> {
        let mut replies = self.replies.lock().await;
        loop {
            match replies.recv().await {
                Some(text) if filter(&text) => return Ok(text),
                Some(_) => continue,
                None => std::future::pending::<()>().await,
            }
        }
    }
}

#[async_trait]
impl PrivateMessaging for FakePlatform {
    async fn open_private_channel(&self, _member: &Member) -> Result<Box<dyn PrivateChannel>> {
        self.check(Op::OpenDm)?;
        let fail_send = self.failures.lock().unwrap().get(&Op::SendDm).copied();
        Ok(Box::new(FakeDm {
            sent: Arc::clone(&self.dm_sent),
            replies: Arc::clone(&self.dm_rx),
            fail_send,
        }))
    }
}

#[async_trait]
impl VoiceChannels for FakePlatform {
    async fn create_voice_channel(
        &self,
        _guild_id: GuildId,
        name: &str,
        category: Option<ChannelId>,
        _reason: &str,
    ) -> Result<ChannelId> {
        self.check(Op::Create)?;
        let id = ChannelId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.channels.lock().unwrap().insert(id, ChannelInfo {
            id,
            name: name.to_string(),
            kind: ChannelKind::Voice,
            parent_id: category,
            position: 0,
        });
        self.record(Call::Create {
            id,
            name: name.to_string(),
            category,
        });
        Ok(id)
    }

    async fn move_member(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        channel: Option<ChannelId>,
    ) -> Result<()> {
        self.check(Op::Move)?;
        self.record(Call::Move {
            user: user_id,
            to: channel,
        });
        Ok(())
    }

    async fn delete_channel(&self, channel_id: ChannelId, reason: &str) -> Result<()> {
        self.check(Op::Delete)?;
        self.channels.lock().unwrap().remove(&channel_id);
        self.record(Call::Delete {
            channel: channel_id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn member_count(&self, _guild_id: GuildId, channel_id: ChannelId) -> Result<usize> {
        self.member_count_calls.lock().unwrap().insert(channel_id);
        self.check(Op::MemberCount)?;
        if !self.channels.lock().unwrap().contains_key(&channel_id) {
            return Err(PlatformError::not_found(format!("channel {channel_id}")));
        }
        Ok(self
            .occupancy
            .lock()
            .unwrap()
            .get(&channel_id)
            .copied()
            .unwrap_or(0))
    }
}

#[async_trait]
impl TextChannels for FakePlatform {
    async fn channel_info(&self, _guild_id: GuildId, channel_id: ChannelId) -> Result<ChannelInfo> {
        self.check(Op::ChannelInfo)?;
        self.channels
            .lock()
            .unwrap()
            .get(&channel_id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found(format!("channel {channel_id}")))
    }

    async fn text_channels(
        &self,
        _guild_id: GuildId,
        category: Option<ChannelId>,
    ) -> Result<Vec<ChannelInfo>> {
        let mut list: Vec<_> = self
            .channels
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.kind == ChannelKind::Text && c.parent_id == category)
            .cloned()
            .collect();
        list.sort_by_key(|c| (c.position, c.id));
        Ok(list)
    }

    async fn send_message(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        self.check(Op::Post)?;
        self.record(Call::Post {
            channel: channel_id,
            text: text.to_string(),
        });
        Ok(())
    }
}

pub fn member() -> Member {
    Member {
        user_id: UserId(7),
        display_name: "alice".into(),
    }
}
