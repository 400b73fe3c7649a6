use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChannelAccount, ConversationAccount};

/// Activity type names used on the wire
pub mod activity_types {
    pub const MESSAGE: &str = "message";
    pub const CONVERSATION_UPDATE: &str = "conversationUpdate";
}

/// A single conversational event exchanged with a channel
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_added: Option<Vec<ChannelAccount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

/// Typed view of an activity, carrying only the fields relevant to each kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind<'a> {
    Message {
        text: Option<&'a str>,
    },
    ConversationUpdate {
        members_added: &'a [ChannelAccount],
        recipient_id: Option<&'a str>,
    },
    Other(&'a str),
}

impl Activity {
    pub fn new(activity_type: impl Into<String>) -> Self {
        Self {
            activity_type: activity_type.into(),
            ..Default::default()
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::new(activity_types::MESSAGE).with_text(text)
    }

    pub fn conversation_update(members_added: Vec<ChannelAccount>) -> Self {
        let mut activity = Self::new(activity_types::CONVERSATION_UPDATE);
        activity.members_added = Some(members_added);
        activity
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_from(mut self, from: ChannelAccount) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_recipient(mut self, recipient: ChannelAccount) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_conversation(mut self, conversation: ConversationAccount) -> Self {
        self.conversation = Some(conversation);
        self
    }

    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = Some(service_url.into());
        self
    }

    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn kind(&self) -> ActivityKind<'_> {
        match self.activity_type.as_str() {
            activity_types::MESSAGE => ActivityKind::Message {
                text: self.text.as_deref(),
            },
            activity_types::CONVERSATION_UPDATE => ActivityKind::ConversationUpdate {
                members_added: self.members_added.as_deref().unwrap_or_default(),
                recipient_id: self.recipient_id(),
            },
            other => ActivityKind::Other(other),
        }
    }

    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient.as_ref().map(|r| r.id.as_str())
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation
            .as_ref()
            .map(|c| c.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Build a message addressed back to the sender of this activity
    pub fn create_reply(&self, text: impl Into<String>) -> Activity {
        Activity {
            activity_type: activity_types::MESSAGE.to_string(),
            id: None,
            timestamp: Some(Utc::now()),
            service_url: self.service_url.clone(),
            channel_id: self.channel_id.clone(),
            from: self.recipient.clone(),
            recipient: self.from.clone(),
            conversation: self.conversation.clone(),
            text: Some(text.into()),
            members_added: None,
            reply_to_id: self.id.clone(),
        }
    }
}
