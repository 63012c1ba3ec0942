//! `show`: list events.

use calassist_core::{format_events_at, json_events, Attribute};
use chrono::{DateTime, Utc};

use crate::assistant::CalendarAssistant;
use crate::cli::OutputFormat;
use crate::commands::to_json;
use crate::error::AssistantResult;
use crate::parse::DateSpec;

/// Lists the events on the dates of `spec`. With `commitments`, only
/// events scheduled with someone else that were not declined are shown.
///
/// Text output marks `now` among today's events.
pub async fn run(
    assistant: &CalendarAssistant,
    spec: &DateSpec,
    commitments: bool,
    format: OutputFormat,
    now: DateTime<Utc>,
) -> AssistantResult<String> {
    let events = assistant.find_events(spec).await?;
    let identity = assistant.self_identity();

    match format {
        OutputFormat::Text => Ok(format_events_at(
            &events,
            identity,
            &assistant.time_zone(),
            commitments,
            now,
        )),
        OutputFormat::Json => {
            let mut views = json_events(&events, identity);
            if commitments {
                views.retain(|v| v.attributes.contains(Attribute::Commitment));
            }
            to_json(&views)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::assistant::tests::{assistant_over, date, marker, meeting};
    use calassist_core::ContainmentPolicy;
    use calassist_providers::{MemoryTransport, RawAttendee};
    use chrono::TimeZone;

    fn before_the_range() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 10, 1, 12, 0, 0).unwrap()
    }

    async fn assistant() -> CalendarAssistant {
        let transport = Arc::new(MemoryTransport::new().with_events(
            "primary",
            vec![
                meeting("Standup", (18, 9), (18, 10)),
                marker("Lyon", 18, 19),
                meeting("1:1", (18, 14), (18, 15))
                    .with_attendee(RawAttendee::new("primary").with_response("accepted"))
                    .with_attendee(RawAttendee::new("sam@example.com").with_response("accepted")),
                meeting("Tomorrow", (19, 9), (19, 10)),
            ],
        ));
        assistant_over(transport, ContainmentPolicy::Trim).await
    }

    #[tokio::test]
    async fn text_lists_the_day_in_order() {
        let output = run(
            &assistant().await,
            &DateSpec::single(date(18)),
            false,
            OutputFormat::Text,
            before_the_range(),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(output, @r"
        2018-10-18                | 🗺  Lyon (not-busy, self)
        2018-10-18  09:00 - 10:00 | Standup (self)
        2018-10-18  14:00 - 15:00 | 1:1 (one-on-one)
        ");
    }

    #[tokio::test]
    async fn today_marks_now() {
        let now = Utc.with_ymd_and_hms(2018, 10, 18, 12, 5, 0).unwrap();
        let output = run(
            &assistant().await,
            &DateSpec::single(date(18)),
            false,
            OutputFormat::Text,
            now,
        )
        .await
        .unwrap();
        insta::assert_snapshot!(output, @r"
        2018-10-18                | 🗺  Lyon (not-busy, self)
        2018-10-18  09:00 - 10:00 | Standup (self)
        2018-10-18  12:05         | now
        2018-10-18  14:00 - 15:00 | 1:1 (one-on-one)
        ");
    }

    #[tokio::test]
    async fn commitments_only() {
        let assistant = assistant().await;
        let spec = DateSpec::single(date(18));

        let output = run(&assistant, &spec, true, OutputFormat::Text, before_the_range())
            .await
            .unwrap();
        assert_eq!(output, "2018-10-18  14:00 - 15:00 | 1:1 (one-on-one)");

        let json = run(&assistant, &spec, true, OutputFormat::Json, before_the_range())
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["summary"], "1:1");
        assert_eq!(
            value[0]["attributes"],
            serde_json::json!(["accepted", "commitment", "one-on-one"])
        );
    }

    #[tokio::test]
    async fn empty_range() {
        let output = run(
            &assistant().await,
            &DateSpec::single(date(25)),
            false,
            OutputFormat::Text,
            before_the_range(),
        )
        .await
        .unwrap();
        assert_eq!(output, "No events in this time range.");
    }
}
