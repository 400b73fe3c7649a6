//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use crate::domain::entities::{Activity, ChannelAccount, ConversationAccount};
use crate::domain::traits::ChannelAdapter;
use crate::application::errors::BotError;

const CHANNEL_ID: &str = "console";

/// Console adapter that prints replies for local development
pub struct ConsoleAdapter {
    user: ChannelAccount,
    bot: ChannelAccount,
    conversation: ConversationAccount,
    output: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl ConsoleAdapter {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self::with_output(bot_name, Box::new(tokio::io::stdout()))
    }

    pub fn with_output(bot_name: impl Into<String>, output: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self {
            user: ChannelAccount::new("user").with_name("User"),
            bot: ChannelAccount::new("bot").with_name(bot_name),
            conversation: ConversationAccount::new(uuid::Uuid::new_v4().to_string()),
            output: Mutex::new(output),
        }
    }

    fn address(&self, activity: Activity) -> Activity {
        activity
            .with_id(uuid::Uuid::new_v4().to_string())
            .with_channel_id(CHANNEL_ID)
            .with_from(self.user.clone())
            .with_recipient(self.bot.clone())
            .with_conversation(self.conversation.clone())
    }

    /// Activity announcing that the user and the bot joined the conversation
    pub fn join_activity(&self) -> Activity {
        self.address(Activity::conversation_update(vec![
            self.user.clone(),
            self.bot.clone(),
        ]))
    }

    /// Activity carrying a line typed by the user
    pub fn message_activity(&self, text: impl Into<String>) -> Activity {
        self.address(Activity::message(text))
    }
}

#[async_trait]
impl ChannelAdapter for ConsoleAdapter {
    fn name(&self) -> &str {
        CHANNEL_ID
    }

    async fn send_activity(&self, activity: &Activity) -> Result<String, BotError> {
        let line = format!("[BOT] {}\n", activity.text.as_deref().unwrap_or_default());
        let mut output = self.output.lock().await;
        output
            .write_all(line.as_bytes())
            .await
            .map_err(|e| BotError::Internal(e.to_string()))?;
        output
            .flush()
            .await
            .map_err(|e| BotError::Internal(e.to_string()))?;
        Ok(uuid::Uuid::new_v4().to_string())
    }
}
