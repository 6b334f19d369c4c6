use teloxide::utils::command::BotCommands;

use crate::{catalog::Catalog, commands::Command, state::Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    Share,
    CareInfo,
    ContactStaff,
    LeaveFeedback,
    Restart,
    Back,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::Share,
        MenuAction::CareInfo,
        MenuAction::ContactStaff,
        MenuAction::LeaveFeedback,
        MenuAction::Restart,
        MenuAction::Back,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Share => "Поделиться результатом",
            MenuAction::CareInfo => "Узнать о программе опеки",
            MenuAction::ContactStaff => "Связаться с сотрудником",
            MenuAction::LeaveFeedback => "Оставить отзыв",
            MenuAction::Restart => "Попробовать ещё раз?",
            MenuAction::Back => "Назад",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.label() == text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    Start,
    Answer(&'a str),
    Menu(MenuAction),
    Feedback(&'a str),
    Unmatched,
}

fn is_start_command(text: &str, bot_name: &str) -> bool {
    // deep-link payloads arrive as `/start <payload>`
    matches!(Command::parse(text, bot_name), Ok(Command::Start(_)))
}

/// `/start` always wins. While feedback is awaited every other text is feedback.
/// Otherwise option labels take precedence over menu labels.
pub fn classify<'a>(
    text: &'a str,
    bot_name: &str,
    stage: Option<Stage>,
    catalog: &Catalog,
) -> Event<'a> {
    if is_start_command(text, bot_name) {
        return Event::Start;
    }
    if stage.is_some_and(|stage| stage.is_awaiting_feedback()) {
        return Event::Feedback(text);
    }
    if catalog.is_option(text) {
        return Event::Answer(text);
    }
    match MenuAction::from_label(text) {
        Some(action) => Event::Menu(action),
        None => Event::Unmatched,
    }
}
