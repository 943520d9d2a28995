use core::fmt::{self, Display};
use model::{AnswerError, JoinError, OptionError};

#[derive(Debug)]
pub enum Error {
    UnsupportedInteraction,
    UnknownUser,
    UnknownCommandName,
    UnknownParamName,
    InvalidParams,
    InvalidOptions(OptionError),
    NoChannel,
    GameInProgress,
    UnknownGame,
    NotHost,
    /// The game did not reply in time. The request stays queued.
    Busy,
    Join(JoinError),
    Answer(AnswerError),
    Fatal,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnsupportedInteraction => "Unsupported interaction.",
            Self::UnknownUser => "Unknown user.",
            Self::UnknownCommandName => "Unknown command name.",
            Self::UnknownParamName => "Unknown parameter name.",
            Self::InvalidParams => "Invalid parameter list.",
            Self::InvalidOptions(err) => return Display::fmt(err, f),
            Self::NoChannel => "Trivia can only be played in a channel.",
            Self::GameInProgress => "A game of trivia is already running in this channel.",
            Self::UnknownGame => "This game of trivia has already ended.",
            Self::NotHost => "Only the host may cancel this game.",
            Self::Busy => "The game is busy right now. Your request is queued and will be handled shortly.",
            Self::Join(err) => return Display::fmt(err, f),
            Self::Answer(err) => return Display::fmt(err, f),
            Self::Fatal => "Oops! We have encountered an unrecoverable error on our end.",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
