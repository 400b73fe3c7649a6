//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: The echo bot and turn orchestration
//! - Turn: Per-activity context and the handler trait
//! - Errors: Domain-specific errors

pub mod errors;
pub mod services;
pub mod turn;
