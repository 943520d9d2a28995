use core::{
    fmt::{self, Display},
    ops::RangeInclusive,
    time::Duration,
};

use crate::question::{category_name, Difficulty, Kind};

/// Which questions to ask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionFilter {
    /// Number of rounds to play.
    pub amount: u8,
    /// Open Trivia DB category identifier. `None` allows any category.
    pub category: Option<u8>,
    pub difficulty: Option<Difficulty>,
    pub kind: Option<Kind>,
}

impl Default for QuestionFilter {
    fn default() -> Self {
        Self { amount: 10, category: None, difficulty: None, kind: None }
    }
}

/// Tunables of a single game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    pub min_players: u8,
    pub max_players: u8,
    /// How long the queue accepts new players.
    pub queue_time: Duration,
    /// How long players may answer each question.
    pub question_time: Duration,
    /// Pause between the result of one round and the next question.
    pub round_interval: Duration,
    /// Points for a correct answer given at the last moment.
    pub min_points: u32,
    /// Points for an instant correct answer.
    pub max_points: u32,
    /// Extra points per consecutive correct answer.
    pub streak_points: u32,
    pub max_streak_bonus: u32,
    pub questions: QuestionFilter,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_players: 1,
            max_players: 50,
            queue_time: Duration::from_secs(20),
            question_time: Duration::from_secs(20),
            round_interval: Duration::from_secs(5),
            min_points: 10,
            max_points: 100,
            streak_points: 20,
            max_streak_bonus: 100,
            questions: QuestionFilter::default(),
        }
    }
}

/// Partial set of options. Only the present fields replace the base options
/// in [`Options::merge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub min_players: Option<u8>,
    pub max_players: Option<u8>,
    pub queue_time: Option<Duration>,
    pub question_time: Option<Duration>,
    pub round_interval: Option<Duration>,
    pub min_points: Option<u32>,
    pub max_points: Option<u32>,
    pub streak_points: Option<u32>,
    pub max_streak_bonus: Option<u32>,
    pub amount: Option<u8>,
    pub category: Option<u8>,
    pub difficulty: Option<Difficulty>,
    pub kind: Option<Kind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionError {
    MinPlayers,
    MaxPlayers,
    QueueTime,
    QuestionTime,
    RoundInterval,
    Points,
    Amount,
    Category,
}

impl Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MinPlayers => "At least one player is required.",
            Self::MaxPlayers => "The player limit must lie between the minimum player count and 50.",
            Self::QueueTime => "The queue must last between 5 and 600 seconds.",
            Self::QuestionTime => "Each question must last between 5 and 120 seconds.",
            Self::RoundInterval => "The pause between rounds must not exceed 60 seconds.",
            Self::Points => "The minimum points must not exceed the maximum points.",
            Self::Amount => "A game must have between 1 and 50 questions.",
            Self::Category => "Unknown question category.",
        })
    }
}

impl Options {
    pub const MAX_PLAYERS: u8 = 50;
    pub const MAX_QUESTIONS: u8 = 50;
    pub const QUEUE_TIME: RangeInclusive<u64> = 5..=600;
    pub const QUESTION_TIME: RangeInclusive<u64> = 5..=120;
    pub const MAX_ROUND_INTERVAL: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn merge(mut self, overrides: &Overrides) -> Self {
        let Overrides {
            min_players,
            max_players,
            queue_time,
            question_time,
            round_interval,
            min_points,
            max_points,
            streak_points,
            max_streak_bonus,
            amount,
            category,
            difficulty,
            kind,
        } = *overrides;
        self.min_players = min_players.unwrap_or(self.min_players);
        self.max_players = max_players.unwrap_or(self.max_players);
        self.queue_time = queue_time.unwrap_or(self.queue_time);
        self.question_time = question_time.unwrap_or(self.question_time);
        self.round_interval = round_interval.unwrap_or(self.round_interval);
        self.min_points = min_points.unwrap_or(self.min_points);
        self.max_points = max_points.unwrap_or(self.max_points);
        self.streak_points = streak_points.unwrap_or(self.streak_points);
        self.max_streak_bonus = max_streak_bonus.unwrap_or(self.max_streak_bonus);
        self.questions.amount = amount.unwrap_or(self.questions.amount);
        self.questions.category = category.or(self.questions.category);
        self.questions.difficulty = difficulty.or(self.questions.difficulty);
        self.questions.kind = kind.or(self.questions.kind);
        self
    }

    pub fn validate(&self) -> Result<(), OptionError> {
        if self.min_players == 0 {
            return Err(OptionError::MinPlayers);
        }

        if self.max_players < self.min_players || self.max_players > Self::MAX_PLAYERS {
            return Err(OptionError::MaxPlayers);
        }

        if !Self::QUEUE_TIME.contains(&self.queue_time.as_secs()) {
            return Err(OptionError::QueueTime);
        }

        if !Self::QUESTION_TIME.contains(&self.question_time.as_secs()) {
            return Err(OptionError::QuestionTime);
        }

        if self.round_interval > Self::MAX_ROUND_INTERVAL {
            return Err(OptionError::RoundInterval);
        }

        if self.min_points > self.max_points {
            return Err(OptionError::Points);
        }

        if !(1..=Self::MAX_QUESTIONS).contains(&self.questions.amount) {
            return Err(OptionError::Amount);
        }

        if let Some(category) = self.questions.category {
            if category_name(category).is_none() {
                return Err(OptionError::Category);
            }
        }

        Ok(())
    }

    /// Points for a correct answer after `elapsed` time. Decays linearly from
    /// `max_points` to `min_points` over the question time.
    pub fn points_for(&self, elapsed: Duration) -> u32 {
        let limit = self.question_time.as_millis();
        if limit == 0 {
            return self.max_points;
        }

        let spread = self.max_points.saturating_sub(self.min_points);
        let elapsed = elapsed.as_millis().min(limit);
        let penalty = u128::from(spread) * elapsed / limit;
        let penalty = u32::try_from(penalty).unwrap_or(spread);
        self.max_points.saturating_sub(penalty)
    }

    /// Bonus for the `streak`-th consecutive correct answer.
    pub fn streak_bonus(&self, streak: u32) -> u32 {
        self.streak_points.saturating_mul(streak.saturating_sub(1)).min(self.max_streak_bonus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = Options::default();
        assert_eq!(options.validate(), Ok(()));
        assert_eq!(options.min_players, 1);
        assert_eq!(options.max_players, 50);
        assert_eq!(options.questions.amount, 10);
        assert_eq!(options.questions.category, None);
    }

    #[test]
    fn empty_overrides_keep_defaults() {
        let options = Options::default().merge(&Overrides::default());
        assert_eq!(options, Options::default());
    }

    #[test]
    fn overrides_replace_present_fields_only() {
        let overrides = Overrides {
            max_players: Some(4),
            question_time: Some(Duration::from_secs(30)),
            difficulty: Some(Difficulty::Hard),
            amount: Some(3),
            ..Default::default()
        };
        let options = Options::default().merge(&overrides);
        assert_eq!(options.max_players, 4);
        assert_eq!(options.question_time, Duration::from_secs(30));
        assert_eq!(options.questions.difficulty, Some(Difficulty::Hard));
        assert_eq!(options.questions.amount, 3);
        assert_eq!(options.min_players, 1);
        assert_eq!(options.queue_time, Duration::from_secs(20));
        assert_eq!(options.questions.kind, None);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let reject = |overrides: Overrides| Options::default().merge(&overrides).validate().unwrap_err();
        assert_eq!(reject(Overrides { min_players: Some(0), ..Default::default() }), OptionError::MinPlayers);
        assert_eq!(
            reject(Overrides { min_players: Some(5), max_players: Some(4), ..Default::default() }),
            OptionError::MaxPlayers
        );
        assert_eq!(reject(Overrides { max_players: Some(51), ..Default::default() }), OptionError::MaxPlayers);
        assert_eq!(
            reject(Overrides { queue_time: Some(Duration::from_secs(4)), ..Default::default() }),
            OptionError::QueueTime
        );
        assert_eq!(
            reject(Overrides { question_time: Some(Duration::from_secs(121)), ..Default::default() }),
            OptionError::QuestionTime
        );
        assert_eq!(
            reject(Overrides { round_interval: Some(Duration::from_secs(61)), ..Default::default() }),
            OptionError::RoundInterval
        );
        assert_eq!(
            reject(Overrides { min_points: Some(200), ..Default::default() }),
            OptionError::Points
        );
        assert_eq!(reject(Overrides { amount: Some(0), ..Default::default() }), OptionError::Amount);
        assert_eq!(reject(Overrides { amount: Some(51), ..Default::default() }), OptionError::Amount);
        assert_eq!(reject(Overrides { category: Some(8), ..Default::default() }), OptionError::Category);
    }

    #[test]
    fn accepts_boundaries() {
        let overrides = Overrides {
            min_players: Some(50),
            max_players: Some(50),
            queue_time: Some(Duration::from_secs(600)),
            question_time: Some(Duration::from_secs(5)),
            round_interval: Some(Duration::ZERO),
            min_points: Some(100),
            amount: Some(50),
            category: Some(32),
            ..Default::default()
        };
        assert_eq!(Options::default().merge(&overrides).validate(), Ok(()));
    }

    #[test]
    fn points_decay_linearly() {
        let options = Options::default();
        assert_eq!(options.points_for(Duration::ZERO), 100);
        assert_eq!(options.points_for(Duration::from_secs(10)), 55);
        assert_eq!(options.points_for(Duration::from_secs(20)), 10);
        assert_eq!(options.points_for(Duration::from_secs(90)), 10);
    }

    #[test]
    fn streak_bonus_is_capped() {
        let options = Options::default();
        assert_eq!(options.streak_bonus(0), 0);
        assert_eq!(options.streak_bonus(1), 0);
        assert_eq!(options.streak_bonus(2), 20);
        assert_eq!(options.streak_bonus(4), 60);
        assert_eq!(options.streak_bonus(6), 100);
        assert_eq!(options.streak_bonus(40), 100);
    }
}
