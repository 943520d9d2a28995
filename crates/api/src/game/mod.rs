mod error;

use crate::{bot::Inner, custom_id::GameId, render};
use alloc::{boxed::Box, string::ToString, sync::Arc};
use core::{fmt::Display, future::IntoFuture, time::Duration};
use model::{AnswerError, Game, JoinError, Kind, Options};
use rand::seq::SliceRandom;
use tokio::{
    sync::{mpsc, oneshot},
    time::{self, Instant},
};
use twilight_model::id::{
    marker::{ApplicationMarker, ChannelMarker, UserMarker},
    Id,
};

pub type UserId = Id<UserMarker>;
pub type ChannelId = Id<ChannelMarker>;

/// A button press forwarded to the game that owns the button.
pub enum Press {
    Join { user: UserId, reply: oneshot::Sender<Result<usize, JoinError>> },
    Answer { user: UserId, round: usize, choice: usize, reply: oneshot::Sender<Result<(), AnswerError>> },
}

pub enum Event {
    Press(Press),
    /// Cancellation request. The reply tells whether the user is the host.
    Stop { user: UserId, reply: oneshot::Sender<bool> },
}

pub type Sender = mpsc::UnboundedSender<Event>;
pub type Receiver = mpsc::UnboundedReceiver<Event>;

/// Registry entry of a running game.
pub struct Handle {
    pub game: GameId,
    pub tx: Sender,
}

/// Everything the game task needs to talk back to the channel.
pub struct Session {
    pub inner: Arc<Inner>,
    pub app: Id<ApplicationMarker>,
    /// Token of the interaction that opened the queue.
    pub token: Box<str>,
    pub channel: ChannelId,
    pub game: GameId,
    pub host: UserId,
    pub options: Options,
}

/// Deadline of each collector run while the questions are fetched.
const FETCH_POLL: Duration = Duration::from_secs(60);

const HOST_CANCELLED: &str = "The host cancelled the game.";

enum Flow {
    Continue,
    Done,
}

#[derive(Debug, PartialEq, Eq)]
enum Collected {
    /// The deadline elapsed or the handler was satisfied.
    Finished,
    /// The host cancelled the game.
    Stopped,
}

/// Feeds presses to `on_press` until the deadline elapses, the handler is done,
/// or the host stops the game.
async fn collect<F>(rx: &mut Receiver, deadline: Instant, host: UserId, mut on_press: F) -> Collected
where
    F: FnMut(Press) -> Flow,
{
    let timer = time::sleep_until(deadline);
    tokio::pin!(timer);
    loop {
        let event = tokio::select! {
            biased;
            Some(event) = rx.recv() => event,
            _ = &mut timer => return Collected::Finished,
            else => return Collected::Finished,
        };
        match event {
            Event::Stop { user, reply } => {
                let is_host = user == host;
                let _ = reply.send(is_host);
                if is_host {
                    return Collected::Stopped;
                }
            }
            Event::Press(press) => {
                if let Flow::Done = on_press(press) {
                    return Collected::Finished;
                }
            }
        }
    }
}

/// Turns away every press. Used while nothing may be joined or answered.
fn reject(press: Press) -> Flow {
    match press {
        Press::Join { reply, .. } => drop(reply.send(Err(JoinError::Closed))),
        Press::Answer { reply, .. } => drop(reply.send(Err(AnswerError::Closed))),
    }
    Flow::Continue
}

/// Queue handler. Done once the queue is full.
fn on_join(game: &mut Game<UserId>, press: Press) -> Flow {
    match press {
        Press::Join { user, reply } => {
            let result = game.join(user);
            log::debug!("{user} joined with {result:?}");
            let _ = reply.send(result);
            if game.is_full() {
                Flow::Done
            } else {
                Flow::Continue
            }
        }
        answer @ Press::Answer { .. } => reject(answer),
    }
}

/// The question currently accepting answers.
struct Round {
    number: usize,
    /// Index of the correct choice.
    answer: usize,
    start: Instant,
}

/// Question handler. Done once every player answered.
fn on_answer(game: &mut Game<UserId>, round: &Round, press: Press) -> Flow {
    match press {
        Press::Answer { user, round: number, choice, reply } => {
            let result = if number == round.number {
                game.answer(user, choice == round.answer, round.start.elapsed())
            } else {
                Err(AnswerError::Closed)
            };
            log::debug!("{user} answered {choice} in round {number} with {result:?}");
            let _ = reply.send(result.map(drop));
            if game.all_answered() {
                Flow::Done
            } else {
                Flow::Continue
            }
        }
        join @ Press::Join { .. } => reject(join),
    }
}

/// Sends an optional cleanup request. Failures are only logged.
async fn best_effort<R, T, E>(what: &str, request: core::result::Result<R, E>)
where
    R: IntoFuture<Output = core::result::Result<T, twilight_http::Error>>,
    E: Display,
{
    let result = match request {
        Ok(request) => request.await.map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    };
    if let Err(err) = result {
        log::warn!("failed to {what}: {err}");
    }
}

impl Session {
    async fn announce_cancel(&self, reason: &str) -> error::Result<()> {
        let embeds = [render::cancelled(reason)];
        self.inner.client.create_message(self.channel).embeds(&embeds)?.await?;
        Ok(())
    }

    async fn play(&self, rx: &mut Receiver) -> error::Result<()> {
        let Self { inner, app, token, channel, game: id, host, options } = self;
        let interaction = inner.client.interaction(*app);
        let mut game = Game::new(*options);

        // Queue
        let deadline = Instant::now() + options.queue_time;
        let collected = collect(rx, deadline, *host, |press| on_join(&mut game, press)).await;

        let reason = if collected == Collected::Stopped {
            Some(HOST_CANCELLED)
        } else if !game.close_queue() {
            Some("Not enough players joined the queue.")
        } else {
            None
        };

        if let Some(reason) = reason {
            let embeds = [render::cancelled(reason)];
            let request = interaction.update_response(token).embeds(Some(&embeds)).and_then(|req| req.components(Some(&[])));
            best_effort("replace the queue message", request).await;
            return Ok(());
        }

        best_effort("remove the join button", interaction.update_response(token).components(Some(&[]))).await;
        log::info!("game {id}: queue closed with {} players", game.player_count());

        // Keep answering presses and stop requests while the questions load
        let fetch = inner.source.fetch(&options.questions);
        tokio::pin!(fetch);
        let fetched = loop {
            tokio::select! {
                biased;
                fetched = &mut fetch => break fetched,
                collected = collect(rx, Instant::now() + FETCH_POLL, *host, reject) => {
                    if collected == Collected::Stopped {
                        return self.announce_cancel(HOST_CANCELLED).await;
                    }
                }
            }
        };

        let questions = match fetched {
            Ok(questions) => questions,
            Err(err) => {
                log::error!("game {id}: cannot fetch questions: {err}");
                return self.announce_cancel(&err.to_string()).await;
            }
        };

        let total = questions.len();
        for (index, question) in questions.iter().enumerate() {
            let number = index + 1;
            let mut choices = question.choices();
            if question.kind == Kind::Multiple {
                choices.shuffle(&mut rand::rng());
            }
            let answer = choices.iter().position(|choice| *choice == question.correct).unwrap_or_default();

            let embeds = [render::question(number, total, question, &choices, options)];
            let components = render::choice_buttons(*id, number, choices.len());
            let message =
                inner.client.create_message(*channel).embeds(&embeds)?.components(&components)?.await?.model().await?;

            game.begin_round();
            let round = Round { number, answer, start: Instant::now() };
            let deadline = round.start + options.question_time;
            let collected = collect(rx, deadline, *host, |press| on_answer(&mut game, &round, press)).await;
            game.end_round();

            let request = inner.client.update_message(*channel, message.id).components(Some(&[]));
            best_effort("remove the answer buttons", request).await;

            if collected == Collected::Stopped {
                return self.announce_cancel(HOST_CANCELLED).await;
            }

            let standings = game.standings();
            let embeds = [render::round_result(number, total, &question.correct, &standings)];
            inner.client.create_message(*channel).embeds(&embeds)?.await?;

            if number < total {
                let collected = collect(rx, Instant::now() + options.round_interval, *host, reject).await;
                if collected == Collected::Stopped {
                    return self.announce_cancel(HOST_CANCELLED).await;
                }
            }
        }

        game.finish();
        let embeds = [render::final_result(&game.standings(), &game.winners())];
        inner.client.create_message(*channel).embeds(&embeds)?.await?;
        Ok(())
    }
}

/// Drives one game from queue to final leaderboard, then releases the channel.
pub async fn run(session: Session, mut rx: Receiver) {
    let Session { ref inner, channel, game, .. } = session;
    log::info!("game {game}: opened in channel {channel}");
    match session.play(&mut rx).await {
        Ok(()) => log::info!("game {game}: ended"),
        Err(err) => log::error!("game {game}: aborted: {err}"),
    }
    inner.games.remove_if(&channel, |_, handle| handle.game == game);
    drop(rx);
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: UserId = Id::new(1);

    type Reply<T> = oneshot::Receiver<T>;

    fn join(user: u64) -> (Event, Reply<Result<usize, JoinError>>) {
        let (reply, verdict) = oneshot::channel();
        (Event::Press(Press::Join { user: Id::new(user), reply }), verdict)
    }

    fn answer(user: u64, round: usize, choice: usize) -> (Event, Reply<Result<(), AnswerError>>) {
        let (reply, verdict) = oneshot::channel();
        (Event::Press(Press::Answer { user: Id::new(user), round, choice, reply }), verdict)
    }

    fn stop(user: u64) -> (Event, Reply<bool>) {
        let (reply, verdict) = oneshot::channel();
        (Event::Stop { user: Id::new(user), reply }, verdict)
    }

    /// A game past its queue with players `1..=count`.
    fn started(count: u64) -> Game<UserId> {
        let mut game = Game::new(Options::default());
        for user in 1..=count {
            game.join(Id::new(user)).unwrap();
        }
        assert!(game.close_queue());
        game.begin_round();
        game
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_ends_collection() {
        let (_tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let collected = collect(&mut rx, start + Duration::from_secs(10), HOST, reject).await;
        assert_eq!(collected, Collected::Finished);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn queue_ends_early_when_full() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (event, early_answer) = answer(10, 1, 0);
        tx.send(event).unwrap();
        let (event, first) = join(10);
        tx.send(event).unwrap();
        let (event, again) = join(10);
        tx.send(event).unwrap();
        let (event, second) = join(20);
        tx.send(event).unwrap();
        let (event, overflow) = join(30);
        tx.send(event).unwrap();

        let mut game = Game::new(Options { max_players: 2, ..Options::default() });
        let start = Instant::now();
        let collected = collect(&mut rx, start + Duration::from_secs(20), HOST, |press| on_join(&mut game, press)).await;

        assert_eq!(collected, Collected::Finished);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(first.await.unwrap(), Ok(1));
        assert_eq!(again.await.unwrap(), Err(JoinError::AlreadyJoined));
        assert_eq!(second.await.unwrap(), Ok(2));
        assert_eq!(early_answer.await.unwrap(), Err(AnswerError::Closed));
        assert_eq!(game.player_count(), 2);
        drop(rx);
        assert!(overflow.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn round_ends_early_when_everyone_answered() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (event, right) = answer(1, 3, 2);
        tx.send(event).unwrap();
        let (event, stale) = answer(2, 2, 2);
        tx.send(event).unwrap();
        let (event, wrong) = answer(2, 3, 0);
        tx.send(event).unwrap();
        let (event, late_join) = join(9);
        tx.send(event).unwrap();

        let mut game = started(2);
        let round = Round { number: 3, answer: 2, start: Instant::now() };
        let deadline = round.start + Duration::from_secs(20);
        let collected = collect(&mut rx, deadline, HOST, |press| on_answer(&mut game, &round, press)).await;

        assert_eq!(collected, Collected::Finished);
        assert_eq!(round.start.elapsed(), Duration::ZERO);
        assert_eq!(right.await.unwrap(), Ok(()));
        assert_eq!(stale.await.unwrap(), Err(AnswerError::Closed));
        assert_eq!(wrong.await.unwrap(), Ok(()));
        drop(rx);
        assert!(late_join.await.is_err());
        assert_eq!(game.player(Id::new(1)).unwrap().points, 100);
        assert!(!game.player(Id::new(2)).unwrap().correct);
    }

    #[tokio::test(start_paused = true)]
    async fn answers_from_an_earlier_round_are_not_scored() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (event, stale) = answer(1, 1, 0);
        tx.send(event).unwrap();

        let mut game = started(1);
        let round = Round { number: 2, answer: 0, start: Instant::now() };
        let deadline = round.start + Duration::from_secs(20);
        let collected = collect(&mut rx, deadline, HOST, |press| on_answer(&mut game, &round, press)).await;

        assert_eq!(collected, Collected::Finished);
        assert_eq!(round.start.elapsed(), Duration::from_secs(20));
        assert_eq!(stale.await.unwrap(), Err(AnswerError::Closed));
        let player = game.player(Id::new(1)).unwrap();
        assert!(!player.answered);
        assert_eq!(player.points, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_host_stops_the_game() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (event, stranger) = stop(5);
        tx.send(event).unwrap();
        let (event, joined) = join(5);
        tx.send(event).unwrap();
        let (event, host) = stop(1);
        tx.send(event).unwrap();
        let (event, after) = join(6);
        tx.send(event).unwrap();

        let mut game = Game::new(Options::default());
        let start = Instant::now();
        let collected = collect(&mut rx, start + Duration::from_secs(20), HOST, |press| on_join(&mut game, press)).await;

        assert_eq!(collected, Collected::Stopped);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(!stranger.await.unwrap());
        assert_eq!(joined.await.unwrap(), Ok(1));
        assert!(host.await.unwrap());
        drop(rx);
        assert!(after.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn intermission_rejects_every_press() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (event, joined) = join(2);
        tx.send(event).unwrap();
        let (event, answered) = answer(2, 1, 0);
        tx.send(event).unwrap();

        let start = Instant::now();
        let collected = collect(&mut rx, start + Duration::from_secs(5), HOST, reject).await;

        assert_eq!(collected, Collected::Finished);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(joined.await.unwrap(), Err(JoinError::Closed));
        assert_eq!(answered.await.unwrap(), Err(AnswerError::Closed));
    }
}
