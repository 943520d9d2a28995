mod config;

use api::{
    interaction::{self, PublicKey},
    Bot,
};
use config::Config;
use http_body_util::Full;
use hyper::{
    body::{Bytes, Incoming},
    server::conn::http1,
    service::service_fn,
    Request, Response,
};
use hyper_util::rt::TokioIo;
use std::{convert::Infallible, net::Ipv4Addr, sync::Arc};
use tokio::{net::TcpListener, runtime::Runtime};

async fn respond(req: Request<Incoming>, public: &PublicKey, bot: &Bot) -> Response<Full<Bytes>> {
    match interaction::try_respond(req, public, bot).await {
        Ok(res) => res,
        Err(code) => {
            log::debug!("rejected request with {code}");
            let mut res = Response::new(Full::default());
            *res.status_mut() = code;
            res
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let source = config.source().await?;
    let bot = Bot::new(config.app, config.token, source, config.defaults);
    bot.register_commands(config.guild).await?;
    log::info!("registered slash commands");

    let public = Arc::new(config.public);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port)).await?;
    log::info!("listening on port {}", config.port);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        let (stream, addr) = tokio::select! {
            biased;
            result = &mut shutdown => {
                result?;
                break;
            }
            result = listener.accept() => match result {
                Ok(pair) => pair,
                Err(err) => {
                    log::warn!("failed to accept connection: {err}");
                    continue;
                }
            },
        };

        let bot = bot.clone();
        let public = Arc::clone(&public);
        let service = service_fn(move |req| {
            let bot = bot.clone();
            let public = Arc::clone(&public);
            async move { Ok::<_, Infallible>(respond(req, &public, &bot).await) }
        });
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                log::error!("connection with {addr} failed: {err}");
            }
        });
    }

    log::info!("shutting down");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::from_env()?;
    let runtime = Runtime::new()?;
    runtime.block_on(serve(config))
}
