use teloxide::types::ChatId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    Keep,
    Buttons(Vec<String>),
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text { text: String, keyboard: Keyboard },
    /// `source` is a local file path or an http(s) URL.
    Photo {
        source: String,
        caption: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub chat: ChatId,
    pub body: Body,
}

impl Outbound {
    pub fn text(chat: ChatId, text: impl Into<String>) -> Self {
        Self::with_keyboard(chat, text, Keyboard::Keep)
    }

    pub fn with_keyboard(chat: ChatId, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            chat,
            body: Body::Text {
                text: text.into(),
                keyboard,
            },
        }
    }

    pub fn photo(chat: ChatId, source: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            chat,
            body: Body::Photo {
                source: source.into(),
                caption,
            },
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.body {
            Body::Text { text, .. } => Some(text),
            Body::Photo { caption, .. } => caption.as_deref(),
        }
    }

    pub fn buttons(&self) -> Option<&[String]> {
        match &self.body {
            Body::Text {
                keyboard: Keyboard::Buttons(labels),
                ..
            } => Some(labels),
            _ => None,
        }
    }
}
