//! CLI, configuration and command handlers
//!
//! This crate provides the `calendar-assistant` command-line interface.

pub mod assistant;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod parse;

pub use assistant::{CalendarAssistant, VideoCall};
pub use cli::Cli;
pub use config::{AssistantConfig, Settings};
pub use error::{AssistantError, AssistantResult};
pub use parse::DateSpec;
