use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dotenvy::dotenv;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use teloxide::utils::command::BotCommands;
use tokio::sync::Mutex;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use zooquiz::catalog::Catalog;
use zooquiz::commands::Command;
use zooquiz::config::Config;
use zooquiz::runner::QuizRunner;
use zooquiz::schema::schema;
use zooquiz::SharedRunner;

const MAX_EVICTION_PERIOD: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(&config.log_level)?;

    let catalog = Catalog::load(config.catalog_path.as_deref())?;
    tracing::info!(questions = catalog.question_count(), "catalog loaded");

    let bot = Bot::new(&config.token);
    let me = bot.get_me().await?;
    tracing::info!(username = me.username(), "Starting bot...");

    let mut settings = config.runner_settings();
    settings.bot_name = me.username().to_owned();
    let runner: SharedRunner = Arc::new(Mutex::new(QuizRunner::new(catalog, settings)));

    if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!(%err, "failed to register bot commands");
    }

    if let Some(ttl) = config.session_ttl {
        spawn_eviction(runner.clone(), ttl);
    }

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![runner])
        .default_handler(|upd| async move {
            tracing::debug!(?upd, "unhandled update");
        })
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(webhook) => {
            tracing::info!(url = %webhook.url, addr = %webhook.addr, "listening for webhook updates");
            let listener = webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        }
        None => dispatcher.dispatch().await,
    }

    Ok(())
}

fn init_tracing(level: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level)?)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    // teloxide logs through `log`
    LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn spawn_eviction(runner: SharedRunner, ttl: Duration) {
    let period = ttl.min(MAX_EVICTION_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            runner.lock().await.evict_idle(Instant::now());
        }
    });
}
