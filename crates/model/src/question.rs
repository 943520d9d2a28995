use alloc::{string::String, vec::Vec};
use core::{
    fmt::{self, Display},
    str::FromStr,
};
use serde::{Deserialize, Serialize};

use crate::options::QuestionFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(match text {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => return Err(UnknownVariant),
        })
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        })
    }
}

/// Shape of the answer set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// One correct answer among several incorrect ones.
    Multiple,
    /// True or false.
    Boolean,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multiple => "multiple",
            Self::Boolean => "boolean",
        }
    }
}

impl FromStr for Kind {
    type Err = UnknownVariant;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(match text {
            "multiple" => Self::Multiple,
            "boolean" => Self::Boolean,
            _ => return Err(UnknownVariant),
        })
    }
}

/// Open Trivia DB category identifiers and the names its results carry.
pub const CATEGORIES: &[(u8, &str)] = &[
    (9, "General Knowledge"),
    (10, "Entertainment: Books"),
    (11, "Entertainment: Film"),
    (12, "Entertainment: Music"),
    (13, "Entertainment: Musicals & Theatres"),
    (14, "Entertainment: Television"),
    (15, "Entertainment: Video Games"),
    (16, "Entertainment: Board Games"),
    (17, "Science & Nature"),
    (18, "Science: Computers"),
    (19, "Science: Mathematics"),
    (20, "Mythology"),
    (21, "Sports"),
    (22, "Geography"),
    (23, "History"),
    (24, "Politics"),
    (25, "Art"),
    (26, "Celebrities"),
    (27, "Animals"),
    (28, "Vehicles"),
    (29, "Entertainment: Comics"),
    (30, "Science: Gadgets"),
    (31, "Entertainment: Japanese Anime & Manga"),
    (32, "Entertainment: Cartoon & Animations"),
];

pub fn category_name(id: u8) -> Option<&'static str> {
    CATEGORIES.iter().find_map(|&(key, name)| (key == id).then_some(name))
}

/// Answer buttons are labelled with letters, so a question offers at most this many choices.
pub const MAX_CHOICES: usize = 10;

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownVariant;

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown variant")
    }
}

/// A single trivia question. The field names follow the Open Trivia DB result
/// schema so that local question files share the same format.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub difficulty: Difficulty,
    #[serde(rename = "question")]
    pub text: String,
    #[serde(rename = "correct_answer")]
    pub correct: String,
    #[serde(rename = "incorrect_answers")]
    pub incorrect: Vec<String>,
}

impl Question {
    /// All choices in canonical order: `True` before `False` for boolean
    /// questions, the correct answer first otherwise. Callers shuffle as needed.
    pub fn choices(&self) -> Vec<String> {
        let mut choices = Vec::with_capacity(self.incorrect.len() + 1);
        choices.push(self.correct.clone());
        choices.extend(self.incorrect.iter().cloned());
        if self.kind == Kind::Boolean {
            choices.sort_unstable_by(|a, b| b.cmp(a));
        }
        choices
    }

    pub fn matches(&self, filter: &QuestionFilter) -> bool {
        filter.category.map_or(true, |id| category_name(id) == Some(self.category.as_str()))
            && filter.difficulty.map_or(true, |diff| diff == self.difficulty)
            && filter.kind.map_or(true, |kind| kind == self.kind)
    }

    /// Checks a question that did not come from the question service.
    pub fn check(&self) -> Result<(), QuestionError> {
        if self.category.trim().is_empty() {
            return Err(QuestionError::Category);
        }

        if self.text.trim().is_empty() {
            return Err(QuestionError::Text);
        }

        let mut answers = core::iter::once(&self.correct).chain(&self.incorrect);
        if answers.any(|answer| answer.trim().is_empty()) {
            return Err(QuestionError::EmptyAnswer);
        }

        if self.incorrect.contains(&self.correct) {
            return Err(QuestionError::DuplicateAnswer);
        }

        let count = self.incorrect.len() + 1;
        match self.kind {
            Kind::Boolean if count != 2 => Err(QuestionError::Choices),
            Kind::Multiple if !(2..=MAX_CHOICES).contains(&count) => Err(QuestionError::Choices),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum QuestionError {
    Category,
    Text,
    EmptyAnswer,
    DuplicateAnswer,
    Choices,
}

impl Display for QuestionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Category => "missing category",
            Self::Text => "missing question text",
            Self::EmptyAnswer => "empty answer",
            Self::DuplicateAnswer => "the correct answer is also listed as incorrect",
            Self::Choices => "boolean questions need exactly two choices, others between 2 and 10",
        })
    }
}
