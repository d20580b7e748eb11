use std::error::Error as StdError;

/// Result type returned by every platform capability.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Failure of a remote platform call.
///
/// `NotFound` is split out because the orchestrator treats a vanished channel
/// as nothing to do, while any other rejection aborts the current session.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The referenced channel, member or message stream no longer exists.
    #[error("{what} not found")]
    NotFound { what: String },

    /// The platform rejected or failed the call.
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The call could not be made at all (adapter not ready, stream closed).
    #[error("platform unavailable: {message}")]
    Unavailable { message: String },
}

impl PlatformError {
    #[must_use]
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what: what.to_string(),
        }
    }

    #[must_use]
    pub fn remote(context: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Remote {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
