use anyhow::Context;
use api::{
    interaction::{parse_public_key, PublicKey},
    model::{Options, Overrides, Question},
    source::{OpenTdb, Source},
};
use std::{
    env::{self, VarError},
    num::NonZeroU64,
    path::PathBuf,
    str::FromStr,
    sync::Arc,
    time::Duration,
};

pub struct Config {
    pub port: u16,
    pub app: NonZeroU64,
    pub token: String,
    pub public: PublicKey,
    /// Guild to register the commands in. Commands are global when absent.
    pub guild: Option<NonZeroU64>,
    /// Local question pool used instead of the remote question API.
    pub questions: Option<PathBuf>,
    pub api_url: Option<String>,
    pub defaults: Options,
}

fn optional<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value.parse().map(Some).with_context(|| format!("cannot parse {key}")),
        Err(VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("cannot read {key}")),
    }
}

fn required<T>(key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional(key)?.with_context(|| format!("missing {key}"))
}

fn seconds(key: &str) -> anyhow::Result<Option<Duration>> {
    Ok(optional(key)?.map(Duration::from_secs))
}

/// Server-wide game defaults from the `TRIVIA_*` variables.
fn overrides() -> anyhow::Result<Overrides> {
    Ok(Overrides {
        min_players: optional("TRIVIA_MIN_PLAYERS")?,
        max_players: optional("TRIVIA_MAX_PLAYERS")?,
        queue_time: seconds("TRIVIA_QUEUE_SECS")?,
        question_time: seconds("TRIVIA_QUESTION_SECS")?,
        round_interval: seconds("TRIVIA_INTERVAL_SECS")?,
        min_points: optional("TRIVIA_MIN_POINTS")?,
        max_points: optional("TRIVIA_MAX_POINTS")?,
        streak_points: optional("TRIVIA_STREAK_POINTS")?,
        max_streak_bonus: optional("TRIVIA_MAX_STREAK_BONUS")?,
        amount: optional("TRIVIA_QUESTIONS")?,
        ..Default::default()
    })
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let key: String = required("PUB_KEY")?;
        let public = parse_public_key(&key).context("PUB_KEY is not a valid hex-encoded public key")?;

        let defaults = Options::default().merge(&overrides()?);
        defaults.validate().map_err(|err| anyhow::anyhow!("invalid trivia defaults: {err}"))?;

        Ok(Self {
            port: required("PORT")?,
            app: required("APP_ID")?,
            token: required("BOT_TOKEN")?,
            public,
            guild: optional("GUILD_ID")?,
            questions: optional("QUESTIONS_FILE")?,
            api_url: optional("TRIVIA_API_URL")?,
            defaults,
        })
    }

    pub async fn source(&self) -> anyhow::Result<Source> {
        if let Some(path) = &self.questions {
            let bytes = tokio::fs::read(path).await.with_context(|| format!("cannot read {}", path.display()))?;
            let questions: Vec<Question> = serde_json::from_slice(&bytes)?;
            anyhow::ensure!(!questions.is_empty(), "{} contains no questions", path.display());
            for (index, question) in questions.iter().enumerate() {
                question.check().map_err(|err| anyhow::anyhow!("question {} in {}: {err}", index + 1, path.display()))?;
            }
            log::info!("loaded {} questions from {}", questions.len(), path.display());
            return Ok(Source::Fixed(Arc::from(questions)));
        }

        Ok(match &self.api_url {
            Some(url) => Source::OpenTdb(OpenTdb::new(url.as_str())),
            None => Source::default(),
        })
    }
}
