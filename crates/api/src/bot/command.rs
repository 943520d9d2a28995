use super::error::{Error, Result};
use alloc::vec::Vec;
use core::time::Duration;
use model::{Difficulty, Kind, Options, Overrides, CATEGORIES};
use twilight_model::application::{
    command::{Command, CommandType},
    interaction::application_command::{CommandDataOption, CommandOptionValue},
};
use twilight_util::builder::command::{CommandBuilder, IntegerBuilder, StringBuilder};

pub const START: &str = "trivia";
pub const STOP: &str = "trivia-stop";
pub const HELP: &str = "trivia-help";

const QUESTIONS: &str = "questions";
const DIFFICULTY: &str = "difficulty";
const CATEGORY: &str = "category";
const TYPE: &str = "type";
const PLAYERS: &str = "players";
const QUEUE: &str = "queue";
const TIME: &str = "time";

/// Slash commands understood by the bot.
pub fn definitions() -> Vec<Command> {
    let start = CommandBuilder::new(START, "Open a trivia queue in this channel.", CommandType::ChatInput)
        .dm_permission(false)
        .option(
            IntegerBuilder::new(QUESTIONS, "Number of questions to play.")
                .min_value(1)
                .max_value(Options::MAX_QUESTIONS.into()),
        )
        .option(StringBuilder::new(DIFFICULTY, "Difficulty of the questions.").choices([
            ("Easy", Difficulty::Easy.as_str()),
            ("Medium", Difficulty::Medium.as_str()),
            ("Hard", Difficulty::Hard.as_str()),
        ]))
        .option(
            IntegerBuilder::new(CATEGORY, "Category of the questions.")
                .choices(CATEGORIES.iter().map(|&(id, name)| (name, i64::from(id)))),
        )
        .option(StringBuilder::new(TYPE, "Kind of questions.").choices([
            ("Multiple Choice", Kind::Multiple.as_str()),
            ("True or False", Kind::Boolean.as_str()),
        ]))
        .option(
            IntegerBuilder::new(PLAYERS, "Maximum number of players.")
                .min_value(1)
                .max_value(Options::MAX_PLAYERS.into()),
        )
        .option(
            IntegerBuilder::new(QUEUE, "Seconds to wait for players to join.")
                .min_value(*Options::QUEUE_TIME.start() as i64)
                .max_value(*Options::QUEUE_TIME.end() as i64),
        )
        .option(
            IntegerBuilder::new(TIME, "Seconds to answer each question.")
                .min_value(*Options::QUESTION_TIME.start() as i64)
                .max_value(*Options::QUESTION_TIME.end() as i64),
        )
        .build();
    let stop = CommandBuilder::new(STOP, "Cancel the trivia game you are hosting in this channel.", CommandType::ChatInput)
        .dm_permission(false)
        .build();
    let help = CommandBuilder::new(HELP, "Learn how to play trivia.", CommandType::ChatInput).build();
    Vec::from([start, stop, help])
}

fn small<T: TryFrom<i64>>(value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| Error::InvalidParams)
}

fn seconds(value: i64) -> Result<Duration> {
    small(value).map(Duration::from_secs)
}

/// Collects the options of the start command. Validation is left to
/// [`Options::validate`] after merging.
pub fn parse_overrides(options: &[CommandDataOption]) -> Result<Overrides> {
    let mut overrides = Overrides::default();
    for CommandDataOption { name, value } in options {
        match (name.as_str(), value) {
            (QUESTIONS, &CommandOptionValue::Integer(value)) => overrides.amount = Some(small(value)?),
            (CATEGORY, &CommandOptionValue::Integer(value)) => overrides.category = Some(small(value)?),
            (PLAYERS, &CommandOptionValue::Integer(value)) => overrides.max_players = Some(small(value)?),
            (QUEUE, &CommandOptionValue::Integer(value)) => overrides.queue_time = Some(seconds(value)?),
            (TIME, &CommandOptionValue::Integer(value)) => overrides.question_time = Some(seconds(value)?),
            (DIFFICULTY, CommandOptionValue::String(value)) => {
                overrides.difficulty = Some(value.parse().map_err(|_| Error::InvalidParams)?);
            }
            (TYPE, CommandOptionValue::String(value)) => {
                overrides.kind = Some(value.parse().map_err(|_| Error::InvalidParams)?);
            }
            (QUESTIONS | CATEGORY | PLAYERS | QUEUE | TIME | DIFFICULTY | TYPE, _) => return Err(Error::InvalidParams),
            _ => return Err(Error::UnknownParamName),
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    fn option(name: &str, value: CommandOptionValue) -> CommandDataOption {
        CommandDataOption { name: String::from(name), value }
    }

    #[test]
    fn no_options_means_no_overrides() {
        assert_eq!(parse_overrides(&[]).unwrap(), Overrides::default());
    }

    #[test]
    fn parses_every_option() {
        let overrides = parse_overrides(&[
            option(QUESTIONS, CommandOptionValue::Integer(5)),
            option(DIFFICULTY, CommandOptionValue::String(String::from("hard"))),
            option(CATEGORY, CommandOptionValue::Integer(18)),
            option(TYPE, CommandOptionValue::String(String::from("boolean"))),
            option(PLAYERS, CommandOptionValue::Integer(8)),
            option(QUEUE, CommandOptionValue::Integer(30)),
            option(TIME, CommandOptionValue::Integer(15)),
        ])
        .unwrap();
        assert_eq!(overrides.amount, Some(5));
        assert_eq!(overrides.difficulty, Some(Difficulty::Hard));
        assert_eq!(overrides.category, Some(18));
        assert_eq!(overrides.kind, Some(Kind::Boolean));
        assert_eq!(overrides.max_players, Some(8));
        assert_eq!(overrides.queue_time, Some(Duration::from_secs(30)));
        assert_eq!(overrides.question_time, Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_bad_options() {
        assert!(matches!(
            parse_overrides(&[option(QUESTIONS, CommandOptionValue::Integer(-1))]),
            Err(Error::InvalidParams)
        ));
        assert!(matches!(
            parse_overrides(&[option(QUESTIONS, CommandOptionValue::String(String::from("ten")))]),
            Err(Error::InvalidParams)
        ));
        assert!(matches!(
            parse_overrides(&[option(DIFFICULTY, CommandOptionValue::String(String::from("extreme")))]),
            Err(Error::InvalidParams)
        ));
        assert!(matches!(
            parse_overrides(&[option("color", CommandOptionValue::Integer(1))]),
            Err(Error::UnknownParamName)
        ));
    }

    #[test]
    fn defines_all_commands() {
        let names: Vec<_> = definitions().into_iter().map(|command| command.name).collect();
        assert_eq!(names, [START, STOP, HELP]);
    }
}
