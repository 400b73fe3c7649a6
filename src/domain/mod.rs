//! Domain layer - Core conversational model
//!
//! This layer contains:
//! - Entities: Activities and the accounts that exchange them
//! - Traits: Abstractions for infrastructure (ChannelAdapter)

pub mod entities;
pub mod traits;
