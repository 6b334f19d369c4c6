use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("question index {index} is out of range (catalog has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no quiz session for user {0}")]
    SessionNotFound(u64),

    #[error("user {0} has no accumulated scores")]
    EmptyScores(u64),

    #[error("'{0}' is not an option of any question")]
    UnknownAnswerText(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog has no questions")]
    Empty,

    #[error("question #{question} has no options")]
    NoOptions { question: usize },

    #[error("question #{question} lists option '{option}' more than once")]
    DuplicateOption { question: usize, option: String },

    #[error("question #{question} weights option '{option}' which it does not offer")]
    UnknownOption { question: usize, option: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{set} is set but {unset} is not")]
    Incomplete {
        set: &'static str,
        unset: &'static str,
    },
}

pub type Result<T, E = QuizError> = std::result::Result<T, E>;
