//! `location` and `location-set`: read and write location markers.

use calassist_core::{format_events, format_location_changes, json_events, LocationChanges};

use crate::assistant::CalendarAssistant;
use crate::cli::OutputFormat;
use crate::commands::to_json;
use crate::error::AssistantResult;
use crate::parse::DateSpec;

/// Lists the location markers on the dates of `spec`.
pub async fn show(
    assistant: &CalendarAssistant,
    spec: &DateSpec,
    format: OutputFormat,
) -> AssistantResult<String> {
    let markers = assistant.find_location_events(spec).await?;
    match format {
        OutputFormat::Text => Ok(format_events(
            &markers,
            assistant.self_identity(),
            &assistant.time_zone(),
            false,
        )),
        OutputFormat::Json => to_json(&json_events(&markers, assistant.self_identity())),
    }
}

/// Sets the location for the dates of `spec` and reports every change.
///
/// When the change stops partway, the edits that did reach the calendar
/// are written to stderr before the error is returned.
pub async fn set(
    assistant: &CalendarAssistant,
    spec: &DateSpec,
    location: &str,
    format: OutputFormat,
) -> AssistantResult<String> {
    match assistant.create_location_event(spec, location).await {
        Ok(changes) => render(assistant, &changes, format),
        Err(e) => {
            if let Some(committed) = e.committed() {
                eprintln!(
                    "Changes committed before the failure:\n{}",
                    render(assistant, committed, format)?
                );
            }
            Err(e)
        }
    }
}

fn render(
    assistant: &CalendarAssistant,
    changes: &LocationChanges,
    format: OutputFormat,
) -> AssistantResult<String> {
    match format {
        OutputFormat::Text => Ok(format_location_changes(
            changes,
            assistant.self_identity(),
            &assistant.time_zone(),
        )),
        OutputFormat::Json => to_json(changes),
    }
}
