//! Domain entities - Core conversational objects

pub mod account;
pub mod activity;

pub use account::{ChannelAccount, ConversationAccount};
pub use activity::{activity_types, Activity, ActivityKind};
