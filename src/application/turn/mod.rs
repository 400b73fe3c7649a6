//! Turn handling - one inbound activity and its replies

pub mod context;
pub mod handler;

pub use context::TurnContext;
pub use handler::ActivityHandler;
