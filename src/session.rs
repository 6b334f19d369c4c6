use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use teloxide::types::UserId;

use crate::{
    catalog::Catalog,
    error::{QuizError, Result},
    state::Stage,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryScores {
    totals: Vec<(String, i64)>,
}

impl CategoryScores {
    fn slot(&mut self, category: &str) -> &mut i64 {
        let pos = match self.totals.iter().position(|(name, _)| name == category) {
            Some(pos) => pos,
            None => {
                self.totals.push((category.to_owned(), 0));
                self.totals.len() - 1
            }
        };
        &mut self.totals[pos].1
    }

    pub fn add(&mut self, category: &str, weight: i64) {
        *self.slot(category) += weight;
    }

    pub fn touch(&mut self, category: &str) {
        self.slot(category);
    }

    pub fn get(&self, category: &str) -> Option<i64> {
        self.totals
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
    }

    /// Highest total; the earliest category wins a tie.
    pub fn best(&self) -> Option<&str> {
        let mut best: Option<&(String, i64)> = None;
        for entry in &self.totals {
            if best.map_or(true, |(_, top)| entry.1 > *top) {
                best = Some(entry);
            }
        }
        best.map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.totals.iter().map(|(name, total)| (name.as_str(), *total))
    }
}

#[derive(Debug, Clone)]
pub struct UserSession {
    stage: Stage,
    scores: CategoryScores,
    last_seen: Instant,
}

impl UserSession {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            scores: CategoryScores::default(),
            last_seen: Instant::now(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn scores(&self) -> &CategoryScores {
        &self.scores
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<UserId, UserSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_session(&mut self, user: UserId) -> &mut UserSession {
        let session = self
            .sessions
            .entry(user)
            .or_insert_with(|| UserSession::new(Stage::first_question()));
        *session = UserSession::new(Stage::first_question());
        session
    }

    pub fn session_or_insert(&mut self, user: UserId, stage: Stage) -> &mut UserSession {
        self.sessions
            .entry(user)
            .or_insert_with(|| UserSession::new(stage))
    }

    pub fn get(&self, user: UserId) -> Option<&UserSession> {
        self.sessions.get(&user)
    }

    pub fn get_mut(&mut self, user: UserId) -> Option<&mut UserSession> {
        self.sessions.get_mut(&user)
    }

    pub fn stage(&self, user: UserId) -> Option<Stage> {
        self.sessions.get(&user).map(UserSession::stage)
    }

    /// Adds the weights of `option` on question `question_index` to the user's totals.
    ///
    /// Every category the question scores is entered into the tally, chosen or not.
    /// A user without a session gets an empty one first.
    pub fn record_answer(
        &mut self,
        catalog: &Catalog,
        user: UserId,
        question_index: usize,
        option: &str,
    ) -> Result<()> {
        let question = catalog.question_at(question_index)?;
        let session = self.session_or_insert(user, Stage::InProgress { question: question_index });

        for category in question.categories() {
            session.scores.touch(category);
        }
        for weight in question.weights_for(option) {
            session.scores.add(weight.category(), weight.weight());
        }
        Ok(())
    }

    pub fn best_category(&self, user: UserId) -> Result<&str> {
        let session = self
            .sessions
            .get(&user)
            .ok_or(QuizError::SessionNotFound(user.0))?;
        session.scores.best().ok_or(QuizError::EmptyScores(user.0))
    }

    pub fn clear(&mut self, user: UserId) -> Option<UserSession> {
        self.sessions.remove(&user)
    }

    pub fn touch(&mut self, user: UserId, now: Instant) {
        if let Some(session) = self.sessions.get_mut(&user) {
            session.last_seen = now;
        }
    }

    pub fn evict_idle(&mut self, now: Instant, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.saturating_duration_since(session.last_seen) <= ttl);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
