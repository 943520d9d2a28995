#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod game;
pub mod options;
pub mod player;
pub mod question;

pub use game::{AnswerError, Game, JoinError, Phase, Standing};
pub use options::{OptionError, Options, Overrides, QuestionFilter};
pub use player::Player;
pub use question::{category_name, Difficulty, Kind, Question, QuestionError, CATEGORIES, MAX_CHOICES};
