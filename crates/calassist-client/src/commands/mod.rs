//! Command handlers.
//!
//! Each handler returns the text to print on stdout, rendered either as
//! text or as JSON depending on the [`OutputFormat`](crate::cli::OutputFormat).

pub mod availability;
pub mod config;
pub mod join;
pub mod location;
pub mod show;

use serde::Serialize;

use crate::error::AssistantResult;

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> AssistantResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
