use std::sync::Arc;
use crate::domain::entities::Activity;
use crate::domain::traits::ChannelAdapter;
use crate::application::errors::BotError;
use crate::application::turn::{ActivityHandler, TurnContext};

/// Outcome of a completed turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    pub activity_type: String,
    pub replies_sent: usize,
}

/// Service for running inbound activities through the bot
pub struct TurnService {
    adapter: Arc<dyn ChannelAdapter>,
    handler: Arc<dyn ActivityHandler>,
}

impl TurnService {
    pub fn new(adapter: Arc<dyn ChannelAdapter>, handler: Arc<dyn ActivityHandler>) -> Self {
        Self { adapter, handler }
    }

    pub fn adapter(&self) -> &Arc<dyn ChannelAdapter> {
        &self.adapter
    }

    /// Authenticate and process one inbound activity, delivering its replies
    pub async fn process_activity(
        &self,
        auth_header: Option<&str>,
        activity: Activity,
    ) -> Result<TurnSummary, BotError> {
        self.adapter.authenticate(auth_header).await?;
        self.run_turn(activity).await
    }

    /// Process an activity whose request has already been authenticated
    pub async fn run_turn(&self, activity: Activity) -> Result<TurnSummary, BotError> {
        let activity_type = activity.activity_type.clone();
        tracing::info!(
            adapter = self.adapter.name(),
            activity_type = %activity_type,
            conversation = activity.conversation_id().unwrap_or("-"),
            "Processing activity"
        );

        let mut ctx = TurnContext::new(activity, Arc::clone(&self.adapter));
        if let Err(e) = self.handler.on_turn(&mut ctx).await {
            tracing::error!("Turn failed for '{}' activity: {}", activity_type, e);
            return Err(e);
        }

        Ok(TurnSummary {
            activity_type,
            replies_sent: ctx.replies_sent(),
        })
    }
}
