mod config_commands;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    anyhow::{Context, bail},
    clap::{Parser, Subcommand},
    secrecy::ExposeSecret,
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    tempvoice_config::validate,
    tempvoice_discord::{DiscordPlatform, start_bot},
    tempvoice_lobby::{ChannelTracker, Orchestrator},
};

#[derive(Parser)]
#[command(name = "tempvoice", about = "Tempvoice: temporary voice channels from lobby joins")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of the standard locations.
    #[arg(long, global = true, env = "TEMPVOICE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and manage lobbies (default when no subcommand is provided).
    Run,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let (config, source) = config_commands::load_effective(config_path)?;
    if let Some(ref file) = source {
        info!(path = %file.display(), "loaded config");
    }

    let result = validate(&config);
    for d in &result.diagnostics {
        match d.severity {
            validate::Severity::Error => error!(path = d.path, "{}", d.message),
            validate::Severity::Warning => warn!(path = d.path, "{}", d.message),
        }
    }
    if result.has_errors() {
        bail!(
            "configuration has {} error(s); run `tempvoice config check` for details",
            result.count(validate::Severity::Error)
        );
    }

    let cancel = CancellationToken::new();
    let (events_tx, events_rx) = mpsc::channel(config.discord.event_buffer);

    let platform = Arc::new(DiscordPlatform::new());
    let orchestrator = Arc::new(Orchestrator::new(
        platform.clone(),
        Arc::new(ChannelTracker::new()),
        Arc::new(config.lobby.clone()),
        cancel.child_token(),
    ));
    let dispatch = tokio::spawn(Arc::clone(&orchestrator).run(events_rx));

    let client = start_bot(
        config.discord.token.expose_secret(),
        platform,
        events_tx,
        cancel.clone(),
    )
    .await
    .context("failed to build discord client")?;

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            info!("ctrl-c received, shutting down");
        },
        () = cancel.cancelled() => warn!("discord client stopped, shutting down"),
    }
    cancel.cancel();

    if let Err(e) = client.await {
        warn!(error = %e, "discord client task failed");
    }
    dispatch.await.context("presence dispatch loop failed")?;

    let leftover = orchestrator.tracker().snapshot();
    if !leftover.is_empty() {
        warn!(tracked = leftover.len(), "exiting with temporary channels still tracked");
    }
    for channel in &leftover {
        warn!(
            guild_id = %channel.guild_id,
            channel_id = %channel.channel_id,
            name = %channel.name,
            age_secs = channel.created_at.elapsed().as_secs(),
            "temporary channel left behind"
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "tempvoice starting");

    match cli.command {
        None | Some(Commands::Run) => run(cli.config.as_deref()).await,
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, cli.config.as_deref())
        },
    }
}
