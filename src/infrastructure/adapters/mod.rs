//! Channel adapters

pub mod botframework;
pub mod console;
pub mod memory;

pub use botframework::BotFrameworkAdapter;
pub use console::ConsoleAdapter;
pub use memory::RecordingAdapter;
