//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Channel integrations (Bot Framework, console, in-memory)
//! - Server: The HTTP messaging endpoint

pub mod config;
pub mod adapters;
pub mod server;
