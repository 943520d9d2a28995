use alloc::string::String;
use twilight_model::id::{marker::InteractionMarker, Id};

/// The interaction that started a game doubles as its identifier.
pub type GameId = Id<InteractionMarker>;

/// What a button press asks of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Join,
    /// Pick a choice of the given round. Rounds count from one.
    Answer { round: usize, choice: usize },
}

const JOIN: &str = "join";

pub fn encode(game: GameId, action: Action) -> String {
    match action {
        Action::Join => alloc::format!("{game}:{JOIN}"),
        Action::Answer { round, choice } => alloc::format!("{game}:{round}:{choice}"),
    }
}

pub fn decode(custom_id: &str) -> Option<(GameId, Action)> {
    let (game, action) = custom_id.split_once(':')?;
    let game = game.parse().ok()?;
    let action = match action {
        JOIN => Action::Join,
        answer => {
            let (round, choice) = answer.split_once(':')?;
            Action::Answer { round: round.parse().ok()?, choice: choice.parse().ok()? }
        }
    };
    Some((game, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_join_and_answers() {
        let game = GameId::new(1_234_567);
        assert_eq!(encode(game, Action::Join), "1234567:join");
        assert_eq!(decode("1234567:join"), Some((game, Action::Join)));
        assert_eq!(encode(game, Action::Answer { round: 2, choice: 3 }), "1234567:2:3");
        assert_eq!(decode("1234567:2:3"), Some((game, Action::Answer { round: 2, choice: 3 })));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("join"), None);
        assert_eq!(decode("0:join"), None);
        assert_eq!(decode("abc:join"), None);
        assert_eq!(decode("123:leave"), None);
        assert_eq!(decode("123:-1"), None);
        assert_eq!(decode("123:3"), None);
        assert_eq!(decode("123:1:-2"), None);
        assert_eq!(decode("123:1:2:3"), None);
    }
}
