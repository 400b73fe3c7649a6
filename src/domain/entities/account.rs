use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant in a conversation: a user or the bot itself
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl fmt::Display for ChannelAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The conversation an activity belongs to
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
}

impl ConversationAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_group: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_name_over_id() {
        let anon = ChannelAccount::new("29:1abc");
        assert_eq!(anon.display_name(), "29:1abc");

        let named = ChannelAccount::new("29:1abc").with_name("Ada");
        assert_eq!(named.to_string(), "Ada");
    }

    #[test]
    fn account_without_id_deserializes_to_empty_id() {
        let account: ChannelAccount = serde_json::from_str(r#"{"name":"Bot"}"#).unwrap();
        assert_eq!(account.id, "");
        assert_eq!(account.name.as_deref(), Some("Bot"));
    }
}
