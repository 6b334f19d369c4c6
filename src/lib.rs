use std::sync::Arc;

use runner::QuizRunner;
use tokio::sync::Mutex;

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod keyboard;
pub mod messages;
pub mod reply;
pub mod router;
pub mod runner;
pub mod schema;
pub mod session;
pub mod state;

pub type SharedRunner = Arc<Mutex<QuizRunner>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
