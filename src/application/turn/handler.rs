use async_trait::async_trait;
use super::TurnContext;
use crate::application::errors::BotError;

/// Bot logic invoked once per inbound activity
#[async_trait]
pub trait ActivityHandler: Send + Sync {
    async fn on_turn(&self, ctx: &mut TurnContext) -> Result<(), BotError>;
}
