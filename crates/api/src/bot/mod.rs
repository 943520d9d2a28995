pub mod command;
mod error;

use crate::{
    custom_id::{self, Action, GameId},
    game::{self, ChannelId, Event, Handle, Press, Session, UserId},
    render,
    source::Source,
};
use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use core::{num::NonZeroU64, time::Duration};
use dashmap::DashMap;
use model::Options;
use tokio::{
    sync::{mpsc, oneshot},
    time,
};
use twilight_model::{
    application::interaction::{
        application_command::{CommandData, CommandDataOption},
        message_component::MessageComponentInteractionData,
        Interaction, InteractionData, InteractionType,
    },
    channel::message::{component::ComponentType, Embed, MessageFlags},
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
    id::{marker::ApplicationMarker, Id},
};

type AppId = Id<ApplicationMarker>;

/// Running games keyed by the channel they are played in.
pub(crate) type Registry = DashMap<ChannelId, Handle>;

pub(crate) struct Inner {
    pub client: twilight_http::Client,
    pub games: Registry,
    pub source: Source,
}

#[derive(Clone)]
pub struct Bot {
    inner: Arc<Inner>,
    id: AppId,
    /// Server-wide options that each `/trivia` invocation refines.
    defaults: Options,
}

fn ephemeral(content: String) -> InteractionResponse {
    InteractionResponse {
        kind: InteractionResponseType::ChannelMessageWithSource,
        data: Some(InteractionResponseData {
            content: Some(content),
            flags: Some(MessageFlags::EPHEMERAL),
            ..Default::default()
        }),
    }
}

/// Discord drops interactions that are not answered within three seconds.
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Forwards an event to a running game and waits for its verdict.
async fn request<T>(tx: game::Sender, event: impl FnOnce(oneshot::Sender<T>) -> Event) -> error::Result<T> {
    let (reply, verdict) = oneshot::channel();
    tx.send(event(reply)).map_err(|_| error::Error::UnknownGame)?;
    time::timeout(REPLY_TIMEOUT, verdict).await.map_err(|_| error::Error::Busy)?.map_err(|_| error::Error::UnknownGame)
}

impl Bot {
    pub fn new(id: NonZeroU64, token: String, source: Source, defaults: Options) -> Self {
        let inner = Inner { client: twilight_http::Client::new(token), games: Registry::new(), source };
        Self { inner: Arc::new(inner), id: Id::from(id), defaults }
    }

    /// Registers the slash commands in one guild, or globally when no guild is given.
    pub async fn register_commands(&self, guild: Option<NonZeroU64>) -> Result<(), twilight_http::Error> {
        let commands = command::definitions();
        let client = self.inner.client.interaction(self.id);
        if let Some(guild) = guild {
            client.set_guild_commands(Id::from(guild), &commands).await?;
        } else {
            client.set_global_commands(&commands).await?;
        }
        Ok(())
    }

    pub async fn on_message(&self, interaction: Interaction) -> InteractionResponse {
        let result = match interaction.kind {
            InteractionType::Ping => Ok(InteractionResponse { kind: InteractionResponseType::Pong, data: None }),
            InteractionType::ApplicationCommand => self.on_app_command(interaction).await,
            InteractionType::MessageComponent => self.on_msg_component(interaction).await,
            _ => Err(error::Error::UnsupportedInteraction),
        };

        use alloc::string::ToString;
        match result {
            Ok(res) => res,
            Err(err) => ephemeral(err.to_string()),
        }
    }

    async fn on_app_command(&self, interaction: Interaction) -> error::Result<InteractionResponse> {
        let Interaction { id, channel, member, user, data, token, .. } = interaction;
        let Some(InteractionData::ApplicationCommand(data)) = data else {
            return Err(error::Error::Fatal);
        };

        let CommandData { name, options, .. } = *data;
        if name == command::HELP {
            return Ok(Self::on_help_command());
        }

        let user = member.and_then(|member| member.user).xor(user).ok_or(error::Error::UnknownUser)?;
        let channel = channel.map(|channel| channel.id).ok_or(error::Error::NoChannel)?;
        match name.as_str() {
            command::START => self.on_start_command(id, channel, user.id, token.into_boxed_str(), &options),
            command::STOP => self.on_stop_command(channel, user.id).await,
            _ => Err(error::Error::UnknownCommandName),
        }
    }

    fn on_start_command(
        &self,
        game: GameId,
        channel: ChannelId,
        host: UserId,
        token: Box<str>,
        options: &[CommandDataOption],
    ) -> error::Result<InteractionResponse> {
        let overrides = command::parse_overrides(options)?;
        let options = self.defaults.merge(&overrides);
        options.validate().map_err(error::Error::InvalidOptions)?;

        use dashmap::mapref::entry::Entry;
        let Entry::Vacant(entry) = self.inner.games.entry(channel) else {
            return Err(error::Error::GameInProgress);
        };

        let (tx, rx) = mpsc::unbounded_channel();
        entry.insert(Handle { game, tx });

        let session = Session { inner: Arc::clone(&self.inner), app: self.id, token, channel, game, host, options };
        tokio::spawn(game::run(session, rx));

        Ok(InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(InteractionResponseData {
                embeds: Some(Vec::from([render::queue(host, &options)])),
                components: Some(render::join_button(game)),
                ..Default::default()
            }),
        })
    }

    async fn on_stop_command(&self, channel: ChannelId, user: UserId) -> error::Result<InteractionResponse> {
        let tx = self.inner.games.get(&channel).map(|handle| handle.tx.clone()).ok_or(error::Error::UnknownGame)?;
        if request(tx, |reply| Event::Stop { user, reply }).await? {
            Ok(ephemeral(String::from("The game has been cancelled.")))
        } else {
            Err(error::Error::NotHost)
        }
    }

    fn on_help_command() -> InteractionResponse {
        let embeds: Vec<Embed> = Vec::from([render::help()]);
        InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(InteractionResponseData {
                embeds: Some(embeds),
                flags: Some(MessageFlags::EPHEMERAL),
                ..Default::default()
            }),
        }
    }

    /// Responds to button presses on queue and question messages.
    async fn on_msg_component(&self, interaction: Interaction) -> error::Result<InteractionResponse> {
        let Interaction { channel, member, user, data, .. } = interaction;
        let user = member.and_then(|member| member.user).xor(user).ok_or(error::Error::UnknownUser)?.id;
        let Some(InteractionData::MessageComponent(MessageComponentInteractionData {
            component_type: ComponentType::Button,
            custom_id,
            ..
        })) = data
        else {
            return Err(error::Error::UnsupportedInteraction);
        };

        let (game, action) = custom_id::decode(&custom_id).ok_or(error::Error::Fatal)?;
        let channel = channel.map(|channel| channel.id).ok_or(error::Error::NoChannel)?;
        let tx = self
            .inner
            .games
            .get(&channel)
            .filter(|handle| handle.game == game)
            .map(|handle| handle.tx.clone())
            .ok_or(error::Error::UnknownGame)?;

        let content = match action {
            Action::Join => {
                let count = request(tx, |reply| Event::Press(Press::Join { user, reply }))
                    .await?
                    .map_err(error::Error::Join)?;
                alloc::format!("You joined the game! Players in the queue: {count}.")
            }
            Action::Answer { round, choice } => {
                request(tx, |reply| Event::Press(Press::Answer { user, round, choice, reply }))
                    .await?
                    .map_err(error::Error::Answer)?;
                String::from("Your answer has been locked in.")
            }
        };
        Ok(ephemeral(content))
    }
}
