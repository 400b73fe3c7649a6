//! Application services - Bot logic and turn orchestration

pub mod echo_bot;
pub mod turn_service;

pub use echo_bot::{EchoBot, WELCOME_MESSAGE};
pub use turn_service::{TurnService, TurnSummary};
