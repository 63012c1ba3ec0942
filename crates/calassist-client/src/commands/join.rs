//! `join`: find the meeting running at a moment and open its call link.

use calassist_core::{classify, event_line, CallLink, JsonEvent};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::assistant::CalendarAssistant;
use crate::cli::OutputFormat;
use crate::commands::to_json;
use crate::error::{AssistantError, AssistantResult};

/// What `join` prints, and the link to open if a meeting was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub output: String,
    pub url: Option<String>,
}

#[derive(Serialize)]
struct JoinView<'a> {
    event: JsonEvent<'a>,
    link: &'a CallLink,
}

/// Looks up the meeting to join at `at`. `moment` is the argument as typed,
/// echoed when nothing matches.
pub async fn run(
    assistant: &CalendarAssistant,
    at: DateTime<Utc>,
    moment: &str,
    format: OutputFormat,
) -> AssistantResult<JoinOutcome> {
    let call = assistant.find_video_call(at).await?;
    let identity = assistant.self_identity();

    let output = match (format, &call) {
        (OutputFormat::Text, Some(call)) => format!(
            "{}\n{}",
            event_line(
                &call.event,
                classify(&call.event, identity),
                &assistant.time_zone()
            ),
            call.link.url
        ),
        (OutputFormat::Text, None) => format!(
            "Could not find a meeting '{}' with a video call to join.",
            moment
        ),
        (OutputFormat::Json, call) => to_json(&call.as_ref().map(|call| JoinView {
            event: JsonEvent::new(&call.event, identity),
            link: &call.link,
        }))?,
    };

    Ok(JoinOutcome {
        output,
        url: call.map(|call| call.link.url),
    })
}

/// Opens `url` in the default browser.
pub fn launch(url: &str) -> AssistantResult<()> {
    info!(url = %url, "opening meeting URL");
    open::that(url).map_err(|source| AssistantError::Launch {
        url: url.to_string(),
        source,
    })
}
