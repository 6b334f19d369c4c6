use std::path::Path;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    payloads::{SendMessageSetters, SendPhotoSetters},
    prelude::Requester,
    types::{InputFile, Message, ReplyMarkup, Update},
    Bot,
};
use tracing::instrument;
use url::Url;

use crate::{
    keyboard::reply_keyboard,
    reply::{Body, Keyboard, Outbound},
    runner::Inbound,
    HandlerResult, SharedRunner,
};

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message().endpoint(handle_message)
}

#[instrument(level = "debug", skip_all, fields(chat = msg.chat.id.0))]
async fn handle_message(bot: Bot, msg: Message, runner: SharedRunner) -> HandlerResult {
    let (Some(text), Some(user)) = (msg.text(), msg.from.as_ref()) else {
        tracing::debug!("skipping message without text or sender");
        return Ok(());
    };

    let inbound = Inbound::new(user.id, msg.chat.id, text)
        .with_name(user.first_name.clone(), user.full_name());
    let replies = runner.lock().await.handle(&inbound);

    for reply in replies {
        deliver(&bot, reply).await?;
    }
    Ok(())
}

pub async fn deliver(bot: &Bot, reply: Outbound) -> HandlerResult {
    match reply.body {
        Body::Text { text, keyboard } => {
            let request = bot.send_message(reply.chat, text);
            match keyboard {
                Keyboard::Keep => request.await?,
                Keyboard::Buttons(labels) => request.reply_markup(reply_keyboard(&labels)).await?,
                Keyboard::Remove => request.reply_markup(ReplyMarkup::kb_remove()).await?,
            };
        }
        Body::Photo { source, caption } => match photo_input(&source) {
            Some(photo) => {
                let mut request = bot.send_photo(reply.chat, photo);
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                request.await?;
            }
            None => {
                tracing::warn!(%source, "picture not found, sending caption only");
                if let Some(caption) = caption {
                    bot.send_message(reply.chat, caption).await?;
                }
            }
        },
    }
    Ok(())
}

fn photo_input(source: &str) -> Option<InputFile> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Url::parse(source).ok().map(InputFile::url);
    }
    let path = Path::new(source);
    path.is_file().then(|| InputFile::file(path))
}
