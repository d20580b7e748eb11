use std::sync::Arc;

use {
    serenity::Client,
    tokio::{sync::mpsc, task::JoinHandle},
    tokio_util::sync::CancellationToken,
    tracing::{error, info},
};

use tempvoice_lobby::PresenceChange;

use crate::{error::Result, handler::LobbyHandler, platform::DiscordPlatform};

/// Build the serenity client and run it in the background.
///
/// Voice updates flow into `events`. Cancelling `cancel` shuts every shard
/// down; a client that stops on its own (for example after an invalid token)
/// cancels `cancel` in turn so the rest of the process winds down with it.
pub async fn start_bot(
    token: &str,
    platform: Arc<DiscordPlatform>,
    events: mpsc::Sender<PresenceChange>,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>> {
    let handler = LobbyHandler { platform, events };
    let mut client = Client::builder(token, LobbyHandler::intents())
        .event_handler(handler)
        .await?;

    let shard_manager = Arc::clone(&client.shard_manager);
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        info!("shutting down discord shards");
        shard_manager.shutdown_all().await;
    });

    info!("starting discord client");
    Ok(tokio::spawn(async move {
        match client.start().await {
            Ok(()) => info!("discord client stopped"),
            Err(e) => error!(error = %e, "discord client failed"),
        }
        cancel.cancel();
    }))
}
