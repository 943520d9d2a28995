use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use base64::{engine::general_purpose::STANDARD, Engine};
use core::fmt::{self, Display};
use model::{Question, QuestionFilter};
use rand::seq::SliceRandom;
use serde::Deserialize;

pub const OPEN_TRIVIA_DB: &str = "https://opentdb.com/api.php";

#[derive(Debug)]
pub enum Error {
    /// The request itself failed.
    Fetch,
    /// Not enough questions match the filter.
    NoResults,
    InvalidParameter,
    RateLimited,
    /// The response did not follow the documented schema.
    Schema,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Schema
        } else {
            Self::Fetch
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "Failed to fetch questions.",
            Self::NoResults => "Not enough questions match the chosen options.",
            Self::InvalidParameter => "The question service rejected the chosen options.",
            Self::RateLimited => "The question service is busy. Please try again in a few seconds.",
            Self::Schema => "The question service returned an unexpected response.",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Deserialize)]
struct Response {
    response_code: u8,
    results: Vec<RawQuestion>,
}

/// Question as served with `encode=base64`: every string is encoded.
#[derive(Deserialize)]
struct RawQuestion {
    category: String,
    #[serde(rename = "type")]
    kind: String,
    difficulty: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

fn decode_text(text: &str) -> Result<String> {
    let bytes = STANDARD.decode(text).map_err(|_| Error::Schema)?;
    String::from_utf8(bytes).map_err(|_| Error::Schema)
}

fn decode_question(raw: RawQuestion) -> Result<Question> {
    let RawQuestion { category, kind, difficulty, question, correct_answer, incorrect_answers } = raw;
    Ok(Question {
        category: decode_text(&category)?,
        kind: decode_text(&kind)?.parse().map_err(|_| Error::Schema)?,
        difficulty: decode_text(&difficulty)?.parse().map_err(|_| Error::Schema)?,
        text: decode_text(&question)?,
        correct: decode_text(&correct_answer)?,
        incorrect: incorrect_answers.iter().map(|answer| decode_text(answer)).collect::<Result<_>>()?,
    })
}

fn decode_response(response: Response) -> Result<Vec<Question>> {
    match response.response_code {
        0 => response.results.into_iter().map(decode_question).collect(),
        1 => Err(Error::NoResults),
        2 => Err(Error::InvalidParameter),
        5 => Err(Error::RateLimited),
        _ => Err(Error::Schema),
    }
}

pub struct OpenTdb {
    http: reqwest::Client,
    base: Box<str>,
}

impl OpenTdb {
    pub fn new(base: impl Into<Box<str>>) -> Self {
        Self { http: reqwest::Client::new(), base: base.into() }
    }

    fn url(&self, filter: &QuestionFilter) -> String {
        let QuestionFilter { amount, category, difficulty, kind } = *filter;
        let mut url = alloc::format!("{}?amount={amount}&encode=base64", self.base);
        if let Some(category) = category {
            url += &alloc::format!("&category={category}");
        }
        if let Some(difficulty) = difficulty {
            url += "&difficulty=";
            url += difficulty.as_str();
        }
        if let Some(kind) = kind {
            url += "&type=";
            url += kind.as_str();
        }
        url
    }

    async fn fetch(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let url = self.url(filter);
        log::debug!("requesting questions from {url}");
        let response = self.http.get(url).send().await?.error_for_status()?.json().await?;
        decode_response(response)
    }
}

/// Where the questions of a game come from.
pub enum Source {
    OpenTdb(OpenTdb),
    /// A fixed question pool. Each game draws a random subset.
    Fixed(Arc<[Question]>),
}

impl Default for Source {
    fn default() -> Self {
        Self::OpenTdb(OpenTdb::new(OPEN_TRIVIA_DB))
    }
}

impl Source {
    pub async fn fetch(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        match self {
            Self::OpenTdb(api) => api.fetch(filter).await,
            Self::Fixed(pool) => draw(pool, filter),
        }
    }
}

fn draw(pool: &[Question], filter: &QuestionFilter) -> Result<Vec<Question>> {
    let mut matching: Vec<_> = pool.iter().filter(|question| question.matches(filter)).cloned().collect();
    if matching.is_empty() {
        return Err(Error::NoResults);
    }
    matching.shuffle(&mut rand::rng());
    matching.truncate(usize::from(filter.amount));
    Ok(matching)
}
