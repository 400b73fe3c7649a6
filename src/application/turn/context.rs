//! Turn context - the activity being processed plus a way to reply

use std::sync::Arc;
use crate::domain::entities::Activity;
use crate::domain::traits::ChannelAdapter;
use crate::application::errors::BotError;

/// State for a single turn: one inbound activity and the replies it produced
pub struct TurnContext {
    activity: Activity,
    adapter: Arc<dyn ChannelAdapter>,
    replies_sent: usize,
}

impl TurnContext {
    pub fn new(activity: Activity, adapter: Arc<dyn ChannelAdapter>) -> Self {
        Self {
            activity,
            adapter,
            replies_sent: 0,
        }
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Send a text reply to the conversation this turn came from
    pub async fn send_activity(&mut self, text: impl Into<String>) -> Result<String, BotError> {
        let reply = self.activity.create_reply(text);
        let id = self.adapter.send_activity(&reply).await?;
        self.replies_sent += 1;
        Ok(id)
    }

    pub fn replies_sent(&self) -> usize {
        self.replies_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChannelAccount, ConversationAccount};
    use crate::infrastructure::adapters::memory::RecordingAdapter;

    #[tokio::test]
    async fn send_activity_replies_to_sender() {
        let adapter = Arc::new(RecordingAdapter::new());
        let inbound = Activity::message("ping")
            .with_id("in-1")
            .with_from(ChannelAccount::new("user"))
            .with_recipient(ChannelAccount::new("bot"))
            .with_conversation(ConversationAccount::new("conv"));
        let mut ctx = TurnContext::new(inbound, adapter.clone());

        let id = ctx.send_activity("pong").await.unwrap();

        assert!(!id.is_empty());
        assert_eq!(ctx.replies_sent(), 1);
        let sent = adapter.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text.as_deref(), Some("pong"));
        assert_eq!(sent[0].recipient.as_ref().map(|a| a.id.as_str()), Some("user"));
        assert_eq!(sent[0].reply_to_id.as_deref(), Some("in-1"));
    }

    #[tokio::test]
    async fn failed_send_is_not_counted() {
        let adapter = Arc::new(RecordingAdapter::failing("connector down"));
        let mut ctx = TurnContext::new(Activity::message("ping"), adapter);

        let err = ctx.send_activity("pong").await.unwrap_err();
        assert!(matches!(err, BotError::Network(_)));
        assert_eq!(ctx.replies_sent(), 0);
    }
}
