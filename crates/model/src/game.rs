use alloc::vec::Vec;
use core::{
    fmt::{self, Display},
    time::Duration,
};

use crate::{options::Options, player::Player};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Players may join.
    Queue,
    /// Players may answer the current question.
    Question,
    /// Between rounds. Nobody may join or answer.
    Intermission,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinError {
    Closed,
    AlreadyJoined,
    Full,
}

impl Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "The queue for this game has already closed.",
            Self::AlreadyJoined => "You have already joined this game.",
            Self::Full => "This game is already full.",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerError {
    Closed,
    NotPlaying,
    AlreadyAnswered,
}

impl Display for AnswerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "This question no longer accepts answers.",
            Self::NotPlaying => "You are not playing in this game.",
            Self::AlreadyAnswered => "You have already answered this question.",
        })
    }
}

/// Position of a player on the leaderboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Standing<K> {
    /// One-based rank. Players with equal points share a rank.
    pub rank: usize,
    pub id: K,
    pub player: Player,
}

/// Rules of a single trivia game. Timing is left to the caller, which passes
/// the elapsed time of each answer.
#[derive(Debug)]
pub struct Game<K> {
    options: Options,
    /// Players in join order.
    players: Vec<(K, Player)>,
    phase: Phase,
}

impl<K: Copy + Eq> Game<K> {
    pub fn new(options: Options) -> Self {
        Self { options, players: Vec::new(), phase: Phase::Queue }
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: K) -> Option<&Player> {
        self.players.iter().find_map(|(key, player)| (*key == id).then_some(player))
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= usize::from(self.options.max_players)
    }

    /// Adds a player to the queue. Returns the new player count.
    pub fn join(&mut self, id: K) -> Result<usize, JoinError> {
        if self.phase != Phase::Queue {
            return Err(JoinError::Closed);
        }

        if self.player(id).is_some() {
            return Err(JoinError::AlreadyJoined);
        }

        if self.is_full() {
            return Err(JoinError::Full);
        }

        self.players.push((id, Player::default()));
        Ok(self.players.len())
    }

    /// Closes the queue. Returns `false` (and finishes the game) when fewer
    /// than the minimum number of players joined.
    pub fn close_queue(&mut self) -> bool {
        if self.players.len() < usize::from(self.options.min_players) {
            self.phase = Phase::Finished;
            return false;
        }
        self.phase = Phase::Intermission;
        true
    }

    pub fn begin_round(&mut self) {
        for (_, player) in &mut self.players {
            player.reset_round();
        }
        self.phase = Phase::Question;
    }

    /// Locks in an answer. Returns the points awarded.
    pub fn answer(&mut self, id: K, correct: bool, elapsed: Duration) -> Result<u32, AnswerError> {
        if self.phase != Phase::Question {
            return Err(AnswerError::Closed);
        }

        let options = self.options;
        let player = self
            .players
            .iter_mut()
            .find_map(|(key, player)| (*key == id).then_some(player))
            .ok_or(AnswerError::NotPlaying)?;

        if player.answered {
            return Err(AnswerError::AlreadyAnswered);
        }

        player.answered = true;
        player.correct = correct;
        if !correct {
            player.streak = 0;
            return Ok(0);
        }

        player.streak += 1;
        let awarded = options.points_for(elapsed).saturating_add(options.streak_bonus(player.streak));
        player.points = player.points.saturating_add(awarded);
        Ok(awarded)
    }

    pub fn all_answered(&self) -> bool {
        self.players.iter().all(|(_, player)| player.answered)
    }

    /// Closes the current question. Silence breaks a streak.
    pub fn end_round(&mut self) {
        for (_, player) in &mut self.players {
            if !player.answered {
                player.streak = 0;
            }
        }
        self.phase = Phase::Intermission;
    }

    pub fn finish(&mut self) {
        self.phase = Phase::Finished;
    }

    /// Players ordered by points. Ties keep join order and share a rank.
    pub fn standings(&self) -> Vec<Standing<K>> {
        let mut sorted: Vec<_> = self.players.iter().copied().collect();
        sorted.sort_by(|(_, a), (_, b)| b.points.cmp(&a.points));

        let mut standings = Vec::with_capacity(sorted.len());
        let mut previous = None;
        for (index, (id, player)) in sorted.into_iter().enumerate() {
            let rank = match previous {
                Some((points, rank)) if points == player.points => rank,
                _ => index + 1,
            };
            previous = Some((player.points, rank));
            standings.push(Standing { rank, id, player });
        }
        standings
    }

    /// Top scorers. Empty when nobody scored.
    pub fn winners(&self) -> Vec<K> {
        let best = self.players.iter().map(|(_, player)| player.points).max().unwrap_or_default();
        if best == 0 {
            return Vec::new();
        }
        self.players.iter().filter(|(_, player)| player.points == best).map(|(id, _)| *id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Overrides;

    fn options(min: u8, max: u8) -> Options {
        Options::default().merge(&Overrides { min_players: Some(min), max_players: Some(max), ..Default::default() })
    }

    fn started(players: &[u64]) -> Game<u64> {
        let mut game = Game::new(options(1, 10));
        for &id in players {
            game.join(id).unwrap();
        }
        assert!(game.close_queue());
        game
    }

    #[test]
    fn queue_guards() {
        let mut game = Game::new(options(1, 2));
        assert_eq!(game.join(1), Ok(1));
        assert_eq!(game.join(1), Err(JoinError::AlreadyJoined));
        assert_eq!(game.join(2), Ok(2));
        assert!(game.is_full());
        assert_eq!(game.join(3), Err(JoinError::Full));
        assert!(game.close_queue());
        assert_eq!(game.join(4), Err(JoinError::Closed));
    }

    #[test]
    fn queue_without_quorum_finishes() {
        let mut game = Game::new(options(3, 5));
        game.join(1).unwrap();
        game.join(2).unwrap();
        assert!(!game.close_queue());
        assert_eq!(game.phase(), Phase::Finished);
    }

    #[test]
    fn answers_only_during_questions() {
        let mut game = started(&[1, 2]);
        assert_eq!(game.answer(1, true, Duration::ZERO), Err(AnswerError::Closed));
        game.begin_round();
        assert_eq!(game.answer(3, true, Duration::ZERO), Err(AnswerError::NotPlaying));
        assert_eq!(game.answer(1, true, Duration::ZERO), Ok(100));
        assert_eq!(game.answer(1, false, Duration::ZERO), Err(AnswerError::AlreadyAnswered));
        assert!(!game.all_answered());
        assert_eq!(game.answer(2, false, Duration::ZERO), Ok(0));
        assert!(game.all_answered());
        game.end_round();
        assert_eq!(game.answer(2, true, Duration::ZERO), Err(AnswerError::Closed));
    }

    #[test]
    fn streaks_add_bonus_and_reset() {
        let mut game = started(&[1]);
        let mut round = |correct| {
            game.begin_round();
            let points = game.answer(1, correct, Duration::ZERO).unwrap();
            game.end_round();
            points
        };
        assert_eq!(round(true), 100);
        assert_eq!(round(true), 120);
        assert_eq!(round(true), 140);
        assert_eq!(round(false), 0);
        assert_eq!(round(true), 100);
        let player = game.player(1).unwrap();
        assert_eq!(player.points, 460);
        assert_eq!(player.streak, 1);
    }

    #[test]
    fn silence_breaks_streak() {
        let mut game = started(&[1, 2]);
        game.begin_round();
        game.answer(1, true, Duration::ZERO).unwrap();
        game.end_round();
        game.begin_round();
        game.end_round();
        let player = game.player(1).unwrap();
        assert_eq!(player.streak, 0);
        assert!(!player.answered);
        assert_eq!(player.points, 100);
    }

    #[test]
    fn standings_share_ranks_and_keep_join_order() {
        let mut game = started(&[1, 2, 3, 4]);
        game.begin_round();
        game.answer(2, true, Duration::from_secs(10)).unwrap();
        game.answer(3, true, Duration::ZERO).unwrap();
        game.answer(4, true, Duration::from_secs(10)).unwrap();
        game.end_round();

        let ranks: Vec<_> = game.standings().into_iter().map(|Standing { rank, id, .. }| (rank, id)).collect();
        assert_eq!(ranks, [(1, 3), (2, 2), (2, 4), (4, 1)]);
        assert_eq!(game.winners(), [3]);
    }

    #[test]
    fn nobody_wins_without_points() {
        let mut game = started(&[1, 2]);
        game.begin_round();
        game.answer(1, false, Duration::ZERO).unwrap();
        game.end_round();
        assert!(game.winners().is_empty());
    }
}
