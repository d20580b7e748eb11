use {serenity::http::HttpError, tempvoice_lobby::PlatformError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Map a serenity failure onto the lobby's error taxonomy. Discord answers
/// 404 for channels, members and messages that no longer exist.
pub(crate) fn classify(context: &str, err: serenity::Error) -> PlatformError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) = &err
        && response.status_code.as_u16() == 404
    {
        return PlatformError::not_found(context);
    }
    PlatformError::remote(context, err)
}
