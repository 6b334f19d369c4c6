/// Where a user with a live session stands in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InProgress { question: usize },
    ActionMenu,
    FeedbackPending,
}

impl Stage {
    pub fn first_question() -> Self {
        Stage::InProgress { question: 0 }
    }

    pub fn current_question(&self) -> Option<usize> {
        match self {
            Stage::InProgress { question } => Some(*question),
            _ => None,
        }
    }

    pub fn is_awaiting_feedback(&self) -> bool {
        matches!(self, Stage::FeedbackPending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_opens_at_question_zero() {
        assert_eq!(Stage::first_question().current_question(), Some(0));
        assert!(!Stage::first_question().is_awaiting_feedback());
        assert_eq!(Stage::ActionMenu.current_question(), None);
    }
}
