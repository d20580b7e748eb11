//! Discord adapter for tempvoice.
//!
//! Implements the lobby platform traits on top of serenity and turns gateway
//! voice state updates into [`PresenceChange`](tempvoice_lobby::PresenceChange)
//! events for the dispatch loop.

pub mod bot;
pub mod error;
pub mod handler;
pub mod platform;

pub use {
    bot::start_bot,
    error::{Error, Result},
    handler::LobbyHandler,
    platform::DiscordPlatform,
};
