//! Embed and component builders for every message a game sends.

use crate::custom_id::{self, Action, GameId};
use alloc::{string::String, vec::Vec};
use core::fmt::Write;
use model::{Options, Question, Standing, MAX_CHOICES};
use twilight_model::{
    channel::message::{
        component::{ActionRow, Button, ButtonStyle},
        embed::{EmbedField, EmbedFooter},
        Component, Embed,
    },
    id::{marker::UserMarker, Id},
};

type UserId = Id<UserMarker>;

const BLURPLE: u32 = 0x5865F2;
const GREEN: u32 = 0x57F287;
const RED: u32 = 0xED4245;
const GOLD: u32 = 0xFEE75C;

const LETTERS: [char; MAX_CHOICES] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Discord renders at most five buttons per action row.
const ROW_WIDTH: usize = 5;

fn embed(title: String, description: String, color: u32) -> Embed {
    Embed {
        author: None,
        color: Some(color),
        description: Some(description),
        fields: Vec::new(),
        footer: None,
        image: None,
        kind: String::from("rich"),
        provider: None,
        thumbnail: None,
        timestamp: None,
        title: Some(title),
        url: None,
        video: None,
    }
}

fn field(name: impl Into<String>, value: impl Into<String>) -> EmbedField {
    EmbedField { inline: true, name: name.into(), value: value.into() }
}

fn footer(text: String) -> Option<EmbedFooter> {
    Some(EmbedFooter { icon_url: None, proxy_icon_url: None, text })
}

fn letter(index: usize) -> char {
    LETTERS.get(index).copied().unwrap_or('?')
}

pub fn queue(host: UserId, options: &Options) -> Embed {
    let mut embed = embed(
        String::from("Trivia"),
        alloc::format!(
            "<@{host}> is hosting a game of trivia! Press **Join** to play. The game starts in {} seconds.",
            options.queue_time.as_secs()
        ),
        BLURPLE,
    );
    let filter = &options.questions;
    let category = filter.category.and_then(model::category_name).unwrap_or("Any");
    embed.fields = Vec::from([
        field("Questions", alloc::format!("{}", filter.amount)),
        field("Category", category),
        field("Difficulty", filter.difficulty.map_or(String::from("Any"), |diff| alloc::format!("{diff}"))),
        field("Players", alloc::format!("{} to {}", options.min_players, options.max_players)),
        field("Time per Question", alloc::format!("{} seconds", options.question_time.as_secs())),
    ]);
    embed
}

pub fn join_button(game: GameId) -> Vec<Component> {
    Vec::from([Component::ActionRow(ActionRow {
        components: Vec::from([Component::Button(Button {
            custom_id: Some(custom_id::encode(game, Action::Join)),
            disabled: false,
            emoji: None,
            label: Some(String::from("Join")),
            style: ButtonStyle::Success,
            url: None,
        })]),
    })])
}

pub fn question(round: usize, total: usize, question: &Question, choices: &[String], options: &Options) -> Embed {
    let mut description = alloc::format!("**{}**\n", question.text);
    for (index, choice) in choices.iter().enumerate() {
        let _ = write!(description, "\n**{}.** {choice}", letter(index));
    }

    let mut embed = embed(alloc::format!("Question {round} of {total}"), description, BLURPLE);
    embed.fields = Vec::from([
        field("Category", question.category.as_str()),
        field("Difficulty", alloc::format!("{}", question.difficulty)),
    ]);
    embed.footer = footer(alloc::format!("You have {} seconds to answer.", options.question_time.as_secs()));
    embed
}

pub fn choice_buttons(game: GameId, round: usize, count: usize) -> Vec<Component> {
    let buttons: Vec<_> = (0..count)
        .map(|index| {
            Component::Button(Button {
                custom_id: Some(custom_id::encode(game, Action::Answer { round, choice: index })),
                disabled: false,
                emoji: None,
                label: Some(String::from(letter(index))),
                style: ButtonStyle::Primary,
                url: None,
            })
        })
        .collect();
    buttons.chunks(ROW_WIDTH).map(|row| Component::ActionRow(ActionRow { components: row.to_vec() })).collect()
}

fn leaderboard(standings: &[Standing<UserId>], markers: bool) -> String {
    if standings.is_empty() {
        return String::from("Nobody is playing.");
    }

    let mut board = String::new();
    for Standing { rank, id, player } in standings {
        let marker = match (markers, player.answered, player.correct) {
            (false, ..) => "",
            (true, true, true) => " ✅",
            (true, true, false) => " ❌",
            (true, false, _) => " ⌛",
        };
        let _ = write!(board, "**{rank}.** <@{id}>: {} points", player.points);
        if player.streak > 1 {
            let _ = write!(board, " 🔥{}", player.streak);
        }
        board += marker;
        board.push('\n');
    }
    board
}

pub fn round_result(round: usize, total: usize, correct: &str, standings: &[Standing<UserId>]) -> Embed {
    let mut embed = embed(
        alloc::format!("Results of Question {round} of {total}"),
        leaderboard(standings, true),
        GREEN,
    );
    embed.fields = Vec::from([field("Correct Answer", correct)]);
    if round < total {
        embed.footer = footer(String::from("The next question is coming up..."));
    }
    embed
}

pub fn final_result(standings: &[Standing<UserId>], winners: &[UserId]) -> Embed {
    let mut embed = embed(String::from("Final Leaderboard"), leaderboard(standings, false), GOLD);
    let value = if winners.is_empty() {
        String::from("Nobody scored a single point...")
    } else {
        let mentions: Vec<_> = winners.iter().map(|user| alloc::format!("<@{user}>")).collect();
        alloc::format!("Congratulations to {}!", mentions.join(" "))
    };
    embed.fields = Vec::from([EmbedField { inline: false, name: String::from("Winner"), value }]);
    embed
}

pub fn cancelled(reason: &str) -> Embed {
    embed(String::from("Trivia Cancelled"), String::from(reason), RED)
}

pub fn help() -> Embed {
    let mut embed = embed(
        String::from("Trivia Commands"),
        String::from("Answer quickly: correct answers earn more points the faster they are, and streaks of correct answers earn bonus points."),
        BLURPLE,
    );
    embed.fields = Vec::from([
        EmbedField {
            name: String::from("`/trivia`"),
            value: String::from("Open a queue in this channel. Optionally choose the number of questions, category, difficulty, question type, player limit and timers."),
            inline: false,
        },
        EmbedField {
            name: String::from("`/trivia-stop`"),
            value: String::from("Cancel the game you are hosting in this channel."),
            inline: false,
        },
        EmbedField {
            name: String::from("`/trivia-help`"),
            value: String::from("Summon this help menu!"),
            inline: false,
        },
    ]);
    embed
}
