//! Echo bot for Bot Framework channels
//!
//! Echoes every message back to the conversation it came from and welcomes
//! members who join.

pub mod domain;
pub mod application;
pub mod infrastructure;
