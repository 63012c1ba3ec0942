//! `availability`: free blocks inside the workday.

use calassist_core::format_availability;
use chrono::Duration;

use crate::assistant::CalendarAssistant;
use crate::cli::OutputFormat;
use crate::commands::to_json;
use crate::error::AssistantResult;
use crate::parse::DateSpec;

/// Shows the free blocks of at least `min_duration` on each date of `spec`.
pub async fn run(
    assistant: &CalendarAssistant,
    spec: &DateSpec,
    min_duration: Duration,
    format: OutputFormat,
) -> AssistantResult<String> {
    let days = assistant.availability(spec, min_duration).await?;
    match format {
        OutputFormat::Text => Ok(format_availability(
            &days,
            min_duration,
            &assistant.time_zone(),
        )),
        OutputFormat::Json => to_json(&days),
    }
}
