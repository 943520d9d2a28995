/// Per-game record of a participant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Player {
    pub points: u32,
    /// Whether an answer was locked in during the current round.
    pub answered: bool,
    /// Whether the locked-in answer of the current round was correct.
    pub correct: bool,
    /// Number of consecutive correct answers.
    pub streak: u32,
}

impl Player {
    pub(crate) fn reset_round(&mut self) {
        self.answered = false;
        self.correct = false;
    }
}
