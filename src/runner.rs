use std::time::{Duration, Instant};

use teloxide::types::{ChatId, UserId};
use tracing::instrument;

use crate::{
    catalog::{Catalog, Category},
    error::Result,
    keyboard::{back_menu, feedback_menu, result_menu},
    messages,
    reply::{Keyboard, Outbound},
    router::{classify, Event, MenuAction},
    session::SessionStore,
    state::Stage,
};

pub const DEFAULT_BOT_NAME: &str = "MooZooQuiz";
pub const DEFAULT_SHARE_LINK: &str = "https://t.me/MooZooQuiz?start";

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Username `/start@name` must match.
    pub bot_name: String,
    pub logo: Option<String>,
    pub feedback_chat: Option<ChatId>,
    pub share_link: String,
    pub session_ttl: Option<Duration>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.to_owned(),
            logo: None,
            feedback_chat: None,
            share_link: DEFAULT_SHARE_LINK.to_owned(),
            session_ttl: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user: UserId,
    pub chat: ChatId,
    pub first_name: String,
    pub full_name: String,
    pub text: String,
}

impl Inbound {
    pub fn new(user: UserId, chat: ChatId, text: impl Into<String>) -> Self {
        Self {
            user,
            chat,
            first_name: String::new(),
            full_name: String::new(),
            text: text.into(),
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, full_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.full_name = full_name.into();
        self
    }
}

#[derive(Debug)]
pub struct QuizRunner {
    catalog: Catalog,
    sessions: SessionStore,
    settings: RunnerSettings,
}

impl QuizRunner {
    pub fn new(catalog: Catalog, settings: RunnerSettings) -> Self {
        Self {
            catalog,
            sessions: SessionStore::new(),
            settings,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    #[instrument(level = "info", skip_all, fields(user = inbound.user.0, chat = inbound.chat.0))]
    pub fn handle(&mut self, inbound: &Inbound) -> Vec<Outbound> {
        let stage = self.sessions.stage(inbound.user);
        self.sessions.touch(inbound.user, Instant::now());

        let replies = match classify(&inbound.text, &self.settings.bot_name, stage, &self.catalog) {
            Event::Start => self.start(inbound),
            Event::Answer(text) => self.answer(inbound, stage, text),
            Event::Menu(action) => self.menu(inbound, action),
            Event::Feedback(text) => Ok(self.feedback(inbound, text)),
            Event::Unmatched => {
                tracing::debug!(text = %inbound.text, "dropping unmatched message");
                Ok(Vec::new())
            }
        };

        replies.unwrap_or_else(|err| {
            tracing::error!(%err, "failed to handle message");
            Vec::new()
        })
    }

    pub fn evict_idle(&mut self, now: Instant) -> usize {
        let Some(ttl) = self.settings.session_ttl else {
            return 0;
        };
        let evicted = self.sessions.evict_idle(now, ttl);
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    fn start(&mut self, inbound: &Inbound) -> Result<Vec<Outbound>> {
        tracing::info!(name = %inbound.full_name, "starting quiz");
        self.sessions.start_session(inbound.user);

        let mut replies = Vec::new();
        if let Some(logo) = &self.settings.logo {
            replies.push(Outbound::photo(inbound.chat, logo.clone(), None));
        }
        replies.push(Outbound::text(
            inbound.chat,
            messages::greeting(&inbound.first_name),
        ));
        replies.push(self.ask(inbound.chat, 0)?);
        Ok(replies)
    }

    fn answer(&mut self, inbound: &Inbound, stage: Option<Stage>, text: &str) -> Result<Vec<Outbound>> {
        let Some(current) = stage.and_then(|stage| stage.current_question()) else {
            tracing::debug!(answer = text, ?stage, "ignoring answer outside of a running quiz");
            return Ok(Vec::new());
        };

        if !self.catalog.question_at(current)?.has_option(text) {
            let owner = self.catalog.question_index_of(text)?;
            tracing::debug!(
                answer = text,
                current = current + 1,
                belongs_to = owner + 1,
                "ignoring answer to another question"
            );
            return Ok(Vec::new());
        }

        self.sessions
            .record_answer(&self.catalog, inbound.user, current, text)?;
        tracing::info!(question = current + 1, answer = text, "answer recorded");

        let next = current + 1;
        if next < self.catalog.question_count() {
            self.set_stage(inbound.user, Stage::InProgress { question: next });
            Ok(vec![self.ask(inbound.chat, next)?])
        } else {
            self.set_stage(inbound.user, Stage::ActionMenu);
            Ok(self.show_result(inbound))
        }
    }

    fn menu(&mut self, inbound: &Inbound, action: MenuAction) -> Result<Vec<Outbound>> {
        let chat = inbound.chat;
        tracing::info!(action = action.label(), "menu action");

        let replies = match action {
            MenuAction::Share => {
                let text = self.with_result(inbound.user, |category| {
                    messages::share(category, &self.settings.share_link)
                });
                vec![Outbound::text(chat, text)]
            }
            MenuAction::CareInfo => vec![Outbound::text(chat, messages::CARE_INFO)],
            MenuAction::ContactStaff => {
                let text = self.with_result(inbound.user, messages::contact_staff);
                vec![Outbound::text(chat, text)]
            }
            MenuAction::LeaveFeedback => {
                self.sessions
                    .session_or_insert(inbound.user, Stage::ActionMenu)
                    .set_stage(Stage::FeedbackPending);
                vec![Outbound::with_keyboard(
                    chat,
                    messages::FEEDBACK_PROMPT,
                    Keyboard::Remove,
                )]
            }
            MenuAction::Restart => {
                self.sessions.clear(inbound.user);
                self.sessions.start_session(inbound.user);
                vec![
                    Outbound::text(chat, messages::RESTART),
                    self.ask(chat, 0)?,
                ]
            }
            MenuAction::Back => vec![Outbound::with_keyboard(
                chat,
                messages::CHOOSE_ACTION,
                Keyboard::Buttons(back_menu()),
            )],
        };
        Ok(replies)
    }

    fn feedback(&mut self, inbound: &Inbound, text: &str) -> Vec<Outbound> {
        self.set_stage(inbound.user, Stage::ActionMenu);
        tracing::info!(name = %inbound.full_name, feedback = text, "feedback received");

        let mut replies = Vec::new();
        if let Some(staff) = self.settings.feedback_chat {
            replies.push(Outbound::text(
                staff,
                messages::forwarded_feedback(&inbound.full_name, text),
            ));
        }
        replies.push(Outbound::with_keyboard(
            inbound.chat,
            messages::FEEDBACK_THANKS,
            Keyboard::Remove,
        ));
        replies.push(Outbound::with_keyboard(
            inbound.chat,
            messages::CHOOSE_ACTION_SHORT,
            Keyboard::Buttons(feedback_menu()),
        ));
        replies
    }

    fn show_result(&self, inbound: &Inbound) -> Vec<Outbound> {
        let chat = inbound.chat;
        let category = match self.sessions.best_category(inbound.user) {
            Ok(category) => category,
            Err(err) => {
                tracing::warn!(%err, "quiz finished without a result");
                return vec![Outbound::text(chat, messages::NO_RESULTS)];
            }
        };
        tracing::info!(category, "quiz completed");

        let caption = messages::result_caption(category);
        let result = match self.catalog.category(category).and_then(Category::image) {
            Some(image) => Outbound::photo(chat, image, Some(caption)),
            None => Outbound::text(chat, caption),
        };

        vec![
            result,
            Outbound::with_keyboard(chat, messages::CHOOSE_ACTION, Keyboard::Buttons(result_menu())),
        ]
    }

    fn with_result(&self, user: UserId, render: impl FnOnce(&str) -> String) -> String {
        match self.sessions.best_category(user) {
            Ok(category) => render(category),
            Err(err) => {
                tracing::info!(%err, "no result to report");
                messages::NO_RESULTS.to_owned()
            }
        }
    }

    fn ask(&self, chat: ChatId, index: usize) -> Result<Outbound> {
        let question = self.catalog.question_at(index)?;
        tracing::debug!(number = index + 1, %question, "asking question");
        Ok(Outbound::with_keyboard(
            chat,
            question.text(),
            Keyboard::Buttons(question.options().to_vec()),
        ))
    }

    fn set_stage(&mut self, user: UserId, stage: Stage) {
        if let Some(session) = self.sessions.get_mut(user) {
            session.set_stage(stage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{Question, Weight},
        reply::Body,
    };

    const USER: UserId = UserId(1);
    const CHAT: ChatId = ChatId(10);

    fn runner(settings: RunnerSettings) -> QuizRunner {
        let catalog = Catalog::new(
            vec![Category::new("owl", Some("img/owl.jpg".into()))],
            vec![
                Question::new("Q1", ["A", "B"], vec![Weight::new("A", "fox", 1)]),
                Question::new(
                    "Q2",
                    ["C", "D"],
                    vec![Weight::new("C", "fox", 2), Weight::new("D", "owl", 3)],
                ),
            ],
        )
        .unwrap();
        QuizRunner::new(catalog, settings)
    }

    fn send(runner: &mut QuizRunner, text: &str) -> Vec<Outbound> {
        runner.handle(&Inbound::new(USER, CHAT, text).with_name("Аня", "Аня Петрова"))
    }

    #[test]
    fn start_sends_logo_greeting_and_first_question() {
        let mut runner = runner(RunnerSettings {
            logo: Some("img/logo.jpg".into()),
            ..RunnerSettings::default()
        });

        let replies = send(&mut runner, "/start");
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0], Outbound::photo(CHAT, "img/logo.jpg", None));
        assert!(replies[1].text_content().unwrap().starts_with("Привет, Аня!"));
        assert_eq!(replies[2].text_content(), Some("Q1"));
        assert_eq!(replies[2].buttons().unwrap(), ["A", "B"]);
    }

    #[test]
    fn result_uses_category_picture() {
        let mut runner = runner(RunnerSettings::default());
        send(&mut runner, "/start");
        send(&mut runner, "A");
        let replies = send(&mut runner, "D");

        assert_eq!(
            replies[0].body,
            Body::Photo {
                source: "img/owl.jpg".into(),
                caption: Some(messages::result_caption("owl")),
            }
        );
        assert_eq!(replies[1].buttons().unwrap().len(), 6);
        assert_eq!(runner.sessions().stage(USER), Some(Stage::ActionMenu));
    }

    #[test]
    fn result_without_picture_is_text() {
        let mut runner = runner(RunnerSettings::default());
        send(&mut runner, "/start");
        send(&mut runner, "A");
        let replies = send(&mut runner, "C");

        assert_eq!(replies[0], Outbound::text(CHAT, messages::result_caption("fox")));
    }

    #[test]
    fn stale_answer_is_ignored() {
        let mut runner = runner(RunnerSettings::default());
        send(&mut runner, "/start");
        assert!(send(&mut runner, "D").is_empty());
        assert_eq!(
            runner.sessions().stage(USER),
            Some(Stage::InProgress { question: 0 })
        );
        assert!(runner.sessions().get(USER).unwrap().scores().is_empty());
    }

    #[test]
    fn answer_without_session_is_ignored() {
        let mut runner = runner(RunnerSettings::default());
        assert!(send(&mut runner, "A").is_empty());
        assert!(runner.sessions().is_empty());
    }

    #[test]
    fn start_for_another_bot_keeps_progress() {
        let mut runner = runner(RunnerSettings {
            bot_name: "ZooTestBot".into(),
            ..RunnerSettings::default()
        });
        send(&mut runner, "/start");
        send(&mut runner, "A");

        assert!(send(&mut runner, "/start@SomeOtherBot").is_empty());
        assert_eq!(
            runner.sessions().stage(USER),
            Some(Stage::InProgress { question: 1 })
        );

        let replies = send(&mut runner, "/start@ZooTestBot ref42");
        assert_eq!(replies.last().unwrap().text_content(), Some("Q1"));
        assert!(runner.sessions().get(USER).unwrap().scores().is_empty());
    }

    #[test]
    fn feedback_is_forwarded_to_staff() {
        let staff = ChatId(-100);
        let mut runner = runner(RunnerSettings {
            feedback_chat: Some(staff),
            ..RunnerSettings::default()
        });
        send(&mut runner, "Оставить отзыв");
        let replies = send(&mut runner, "Очень понравилось");

        assert_eq!(
            replies[0],
            Outbound::text(staff, "Пользователь Аня Петрова оставил отзыв:\n\nОчень понравилось")
        );
        assert_eq!(
            replies[1],
            Outbound::with_keyboard(CHAT, messages::FEEDBACK_THANKS, Keyboard::Remove)
        );
        assert_eq!(replies[2].buttons().unwrap(), feedback_menu());
    }

    #[test]
    fn eviction_needs_a_ttl() {
        let later = Instant::now() + Duration::from_secs(3600);

        let mut keep = runner(RunnerSettings::default());
        send(&mut keep, "/start");
        assert_eq!(keep.evict_idle(later), 0);

        let mut evict = runner(RunnerSettings {
            session_ttl: Some(Duration::from_secs(60)),
            ..RunnerSettings::default()
        });
        send(&mut evict, "/start");
        assert_eq!(evict.evict_idle(later), 1);
        assert!(evict.sessions().is_empty());
    }
}
