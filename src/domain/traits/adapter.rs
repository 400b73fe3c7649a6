use async_trait::async_trait;
use crate::domain::entities::Activity;
use crate::application::errors::BotError;

/// Channel adapter - abstraction over a messaging channel's transport
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Adapter name, used in logs
    fn name(&self) -> &str;

    /// Check the credentials presented with an inbound activity
    async fn authenticate(&self, _auth_header: Option<&str>) -> Result<(), BotError> {
        Ok(())
    }

    /// Deliver an outbound activity, returning the id the channel assigned to it
    async fn send_activity(&self, activity: &Activity) -> Result<String, BotError>;
}
