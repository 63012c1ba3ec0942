//! Video-call links found in event fields.
//!
//! [`find_call_links`] pulls every URL out of free text (a description, a
//! location, a conference field), unwraps Outlook SafeLinks and recognises
//! the usual conferencing services by host. Links to a known service sort
//! before anything else.
//!
//! ```
//! use calassist_core::links::{find_call_links, CallService};
//!
//! let links = find_call_links("Dial in: https://acme.zoom.us/j/42?pwd=s3cret&utm_source=x");
//! assert_eq!(links[0].service, CallService::Zoom);
//! assert_eq!(links[0].url, "https://acme.zoom.us/j/42?pwd=s3cret");
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("Invalid URL regex"));

/// Outlook wraps links as `...safelinks.protection.outlook.com/?url=<encoded>&...`.
static SAFELINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^/]*safelinks\.protection\.outlook\.com/?\?(?:[^#]*&)?url=([^&#]+)")
        .expect("Invalid SafeLink regex")
});

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: [char; 4] = ['.', ',', ';', ':'];

/// The service a link points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallService {
    GoogleMeet,
    Hangouts,
    Zoom,
    ZoomGov,
    Teams,
    Jitsi,
    Webex,
    /// Any other URL.
    Other,
}

impl CallService {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::GoogleMeet => "Google Meet",
            Self::Hangouts => "Google Hangouts",
            Self::Zoom => "Zoom",
            Self::ZoomGov => "Zoom for Government",
            Self::Teams => "Microsoft Teams",
            Self::Jitsi => "Jitsi Meet",
            Self::Webex => "Webex",
            Self::Other => "Link",
        }
    }

    /// Returns true for every service that hosts video calls.
    pub fn is_video_call(self) -> bool {
        self != Self::Other
    }

    fn from_host(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        let under = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));

        if host == "meet.google.com" {
            Self::GoogleMeet
        } else if host == "hangouts.google.com" {
            Self::Hangouts
        } else if under("zoomgov.com") {
            Self::ZoomGov
        } else if under("zoom.us") {
            Self::Zoom
        } else if host == "teams.microsoft.com" || host == "teams.live.com" {
            Self::Teams
        } else if host == "meet.jit.si" {
            Self::Jitsi
        } else if under("webex.com") {
            Self::Webex
        } else {
            Self::Other
        }
    }
}

/// A cleaned-up link with the meeting id and passcode it carries, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLink {
    pub service: CallService,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
}

impl CallLink {
    pub fn new(service: CallService, url: impl Into<String>) -> Self {
        Self {
            service,
            url: url.into(),
            meeting_id: None,
            passcode: None,
        }
    }

    pub fn is_video_call(&self) -> bool {
        self.service.is_video_call()
    }
}

/// Classifies and cleans a single URL.
///
/// Zoom links are rewritten to `https://<host>/j/<id>` keeping only the
/// passcode; Meet and Jitsi links lose their query string. Other links are
/// kept as they are once SafeLinks are unwrapped.
pub fn parse_call_link(raw: &str) -> CallLink {
    let unwrapped = unwrap_safelink(raw);
    let Ok(url) = Url::parse(&unwrapped) else {
        return CallLink::new(CallService::Other, unwrapped);
    };
    let Some(host) = url.host_str() else {
        return CallLink::new(CallService::Other, unwrapped);
    };

    let service = CallService::from_host(host);
    match service {
        CallService::Zoom | CallService::ZoomGov => zoom_link(service, host, &url)
            .unwrap_or_else(|| CallLink::new(service, unwrapped.as_str())),
        CallService::GoogleMeet | CallService::Jitsi => room_link(service, host, &url)
            .unwrap_or_else(|| CallLink::new(service, unwrapped.as_str())),
        _ => CallLink::new(service, unwrapped.as_str()),
    }
}

/// Returns every distinct link in `text`, video-call links first and
/// otherwise in order of appearance.
pub fn find_call_links(text: &str) -> Vec<CallLink> {
    let mut seen = HashSet::new();
    let mut links: Vec<CallLink> = URL_RE
        .find_iter(text)
        .map(|m| parse_call_link(m.as_str().trim_end_matches(TRAILING_PUNCTUATION)))
        .filter(|link| seen.insert(link.url.clone()))
        .collect();
    links.sort_by_key(|link| !link.is_video_call());
    links
}

fn unwrap_safelink(raw: &str) -> String {
    SAFELINK_RE
        .captures(raw)
        .and_then(|caps| urlencoding::decode(&caps[1]).ok().map(|d| d.into_owned()))
        .unwrap_or_else(|| raw.to_string())
}

/// `/j/<id>`, `/my/<room>`, `/w/<id>`, `/wc/<id>` or `/join?confno=<id>`.
fn zoom_link(service: CallService, host: &str, url: &Url) -> Option<CallLink> {
    let mut meeting_id = None;
    let mut passcode = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "pwd" | "passcode" => passcode = Some(value.into_owned()),
            "confno" => meeting_id = Some(value.into_owned()),
            _ => {}
        }
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    if let (Some("j" | "my" | "w" | "wc"), Some(id)) = (segments.next(), segments.next()) {
        meeting_id.get_or_insert_with(|| id.to_string());
    }
    let meeting_id = meeting_id?;

    let mut cleaned = format!("https://{}/j/{}", host, meeting_id);
    if let Some(ref pwd) = passcode {
        cleaned.push_str("?pwd=");
        cleaned.push_str(pwd);
    }
    Some(CallLink {
        service,
        url: cleaned,
        meeting_id: Some(meeting_id),
        passcode,
    })
}

/// Rooms named by the first path segment.
fn room_link(service: CallService, host: &str, url: &Url) -> Option<CallLink> {
    let room = url.path_segments()?.find(|s| !s.is_empty())?;
    Some(CallLink {
        service,
        url: format!("https://{}/{}", host, room),
        meeting_id: Some(room.to_string()),
        passcode: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod services {
        use super::*;

        #[test]
        fn zoom_keeps_id_and_passcode_only() {
            let link = parse_call_link("https://zoom.us/j/123456789?pwd=abc&utm_source=mail");
            assert_eq!(link.service, CallService::Zoom);
            assert_eq!(link.url, "https://zoom.us/j/123456789?pwd=abc");
            assert_eq!(link.meeting_id.as_deref(), Some("123456789"));
            assert_eq!(link.passcode.as_deref(), Some("abc"));
        }

        #[test]
        fn zoom_variants() {
            let link = parse_call_link("https://acme.zoom.us/join?confno=987&passcode=x");
            assert_eq!(link.url, "https://acme.zoom.us/j/987?pwd=x");

            let link = parse_call_link("https://zoom.us/my/sam.doe");
            assert_eq!(link.meeting_id.as_deref(), Some("sam.doe"));
            assert!(link.passcode.is_none());

            let link = parse_call_link("https://agency.zoomgov.com/j/55");
            assert_eq!(link.service, CallService::ZoomGov);
            assert_eq!(link.url, "https://agency.zoomgov.com/j/55");
        }

        #[test]
        fn zoom_without_meeting_id_is_kept() {
            let link = parse_call_link("https://zoom.us/signin");
            assert_eq!(link.service, CallService::Zoom);
            assert_eq!(link.url, "https://zoom.us/signin");
            assert!(link.meeting_id.is_none());
        }

        #[test]
        fn meet_and_jitsi_drop_query() {
            let link = parse_call_link("https://meet.google.com/abc-defg-hij/?authuser=1");
            assert_eq!(link.service, CallService::GoogleMeet);
            assert_eq!(link.url, "https://meet.google.com/abc-defg-hij");

            let link = parse_call_link("https://meet.jit.si/Standup?config.startWithAudioMuted=true");
            assert_eq!(link.service, CallService::Jitsi);
            assert_eq!(link.url, "https://meet.jit.si/Standup");
        }

        #[test]
        fn teams_hangouts_and_webex_are_untouched() {
            let teams = "https://teams.microsoft.com/l/meetup-join/19%3ameeting@thread.v2/0?context=x";
            assert_eq!(parse_call_link(teams).url, teams);
            assert_eq!(parse_call_link(teams).service, CallService::Teams);

            let hangout = "https://hangouts.google.com/hangouts/_/example.com/standup";
            assert_eq!(parse_call_link(hangout).service, CallService::Hangouts);
            assert_eq!(parse_call_link(hangout).url, hangout);

            assert_eq!(
                parse_call_link("https://acme.webex.com/meet/sam").service,
                CallService::Webex
            );
        }

        #[test]
        fn lookalike_hosts_are_other() {
            assert_eq!(parse_call_link("https://notzoom.us/j/1").service, CallService::Other);
            assert_eq!(parse_call_link("https://docs.google.com/d/1").service, CallService::Other);
            assert!(!parse_call_link("not a url").is_video_call());
        }

        #[test]
        fn safelinks_are_unwrapped() {
            let wrapped = "https://nam01.safelinks.protection.outlook.com/?url=https%3A%2F%2Fmeet.google.com%2Fabc-defg-hij%3Fauthuser%3D0&data=1";
            let link = parse_call_link(wrapped);
            assert_eq!(link.service, CallService::GoogleMeet);
            assert_eq!(link.url, "https://meet.google.com/abc-defg-hij");
        }
    }

    mod text {
        use super::*;

        #[test]
        fn video_calls_first_then_appearance_order() {
            let links = find_call_links(
                "Agenda https://docs.example.com/a, call https://meet.google.com/abc-defg-hij. \
                 Backup: https://zoom.us/j/1",
            );
            let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
            assert_eq!(
                urls,
                vec![
                    "https://meet.google.com/abc-defg-hij",
                    "https://zoom.us/j/1",
                    "https://docs.example.com/a",
                ]
            );
        }

        #[test]
        fn duplicates_collapse_after_cleaning() {
            let links = find_call_links(
                "https://zoom.us/j/1?pwd=a and https://zoom.us/j/1?pwd=a&utm_medium=cal",
            );
            assert_eq!(links.len(), 1);
        }

        #[test]
        fn html_attributes() {
            let links = find_call_links(r#"<a href="https://meet.jit.si/Room">join</a>"#);
            assert_eq!(links.len(), 1);
            assert_eq!(links[0].url, "https://meet.jit.si/Room");
        }

        #[test]
        fn nothing_to_find() {
            assert!(find_call_links("").is_empty());
            assert!(find_call_links("Room 4B, second floor").is_empty());
        }
    }
}
