use core::fmt::{self, Display};
use twilight_http::response::DeserializeBodyError;
use twilight_validate::message::MessageValidationError;

/// Reasons for a game to abort midway.
#[derive(Debug)]
pub enum Error {
    Http(twilight_http::Error),
    Body(DeserializeBodyError),
    Validation(MessageValidationError),
}

impl From<twilight_http::Error> for Error {
    fn from(err: twilight_http::Error) -> Self {
        Self::Http(err)
    }
}

impl From<DeserializeBodyError> for Error {
    fn from(err: DeserializeBodyError) -> Self {
        Self::Body(err)
    }
}

impl From<MessageValidationError> for Error {
    fn from(err: MessageValidationError) -> Self {
        Self::Validation(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "discord request failed: {err}"),
            Self::Body(err) => write!(f, "unexpected discord response: {err}"),
            Self::Validation(err) => write!(f, "rejected message: {err}"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
