use async_trait::async_trait;
use crate::domain::entities::{Activity, ActivityKind};
use crate::application::errors::BotError;
use crate::application::turn::{ActivityHandler, TurnContext};

/// Reply sent once for every member who joins a conversation
pub const WELCOME_MESSAGE: &str = "Welcome to the bot!";

/// Echoes messages back and welcomes new conversation members
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoBot;

impl EchoBot {
    pub fn new() -> Self {
        Self
    }

    /// Decide the replies for an activity without sending anything
    pub fn replies(&self, activity: &Activity) -> Vec<String> {
        match activity.kind() {
            ActivityKind::Message { text } => text.map(str::to_string).into_iter().collect(),
            ActivityKind::ConversationUpdate {
                members_added,
                recipient_id,
            } => members_added
                .iter()
                .filter(|member| Some(member.id.as_str()) != recipient_id)
                .map(|_| WELCOME_MESSAGE.to_string())
                .collect(),
            ActivityKind::Other(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl ActivityHandler for EchoBot {
    async fn on_turn(&self, ctx: &mut TurnContext) -> Result<(), BotError> {
        let replies = self.replies(ctx.activity());
        if replies.is_empty() {
            tracing::debug!("No reply for '{}' activity", ctx.activity().activity_type);
        }

        for reply in replies {
            ctx.send_activity(reply).await?;
        }
        Ok(())
    }
}
