//! Client configuration.
//!
//! All settings live in the `[settings]` table of a single `config.toml`,
//! at `~/.config/calendar-assistant/config.toml` by default:
//!
//! ```toml
//! [settings]
//! calendar-id = "primary"
//! start-of-day = "9am"
//! end-of-day = "6pm"
//! meeting-length = "30m"
//! timezone = "Europe/Paris"
//! local-store = "/home/me/calendar.json"
//! containment = "trim"
//! ```
//!
//! Command-line options override file settings, which override defaults.

use std::io;
use std::path::{Path, PathBuf};

use calassist_core::{ContainmentPolicy, WorkdayBounds};
use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AssistantError, AssistantResult};
use crate::parse::{parse_duration, parse_time};

const APP_DIR: &str = "calendar-assistant";

/// Configuration for the calendar assistant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub settings: Settings,
}

/// The `[settings]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Calendar to read and write; also the identity used for attendee
    /// lookups.
    pub calendar_id: String,

    /// Start of the workday (`9am`, `14:30`, ...).
    pub start_of_day: String,

    /// End of the workday.
    pub end_of_day: String,

    /// Minimum length of an availability block (`30m`, `1h`, ...).
    pub meeting_length: String,

    /// IANA time zone name. Defaults to the calendar's own zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// JSON event store. Defaults to a file in the user data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_store: Option<PathBuf>,

    /// What happens to a location that strictly contains a new one.
    pub containment: ContainmentPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            start_of_day: "9am".to_string(),
            end_of_day: "6pm".to_string(),
            meeting_length: "30m".to_string(),
            timezone: None,
            local_store: None,
            containment: ContainmentPolicy::default(),
        }
    }
}

/// Settings given on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub calendar_id: Option<String>,
    pub start_of_day: Option<String>,
    pub end_of_day: Option<String>,
    pub meeting_length: Option<String>,
    pub timezone: Option<String>,
    pub local_store: Option<PathBuf>,
}

impl Settings {
    /// Returns these settings with every override that is set applied.
    pub fn merged(mut self, overrides: &SettingsOverrides) -> Self {
        fn set<T: Clone>(field: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *field = value.clone();
            }
        }

        set(&mut self.calendar_id, &overrides.calendar_id);
        set(&mut self.start_of_day, &overrides.start_of_day);
        set(&mut self.end_of_day, &overrides.end_of_day);
        set(&mut self.meeting_length, &overrides.meeting_length);
        if overrides.timezone.is_some() {
            self.timezone = overrides.timezone.clone();
        }
        if overrides.local_store.is_some() {
            self.local_store = overrides.local_store.clone();
        }
        self
    }

    /// Parses the workday bounds, rejecting a start at or after the end.
    pub fn workday(&self) -> AssistantResult<WorkdayBounds> {
        let start = parse_time(&self.start_of_day)?;
        let end = parse_time(&self.end_of_day)?;
        Ok(WorkdayBounds::new(start, end)?)
    }

    pub fn meeting_length(&self) -> AssistantResult<Duration> {
        parse_duration(&self.meeting_length)
    }

    /// Parses the configured time zone, if any.
    pub fn time_zone(&self) -> AssistantResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| AssistantError::Config(format!("unknown time zone '{}'", name)))
            })
            .transpose()
    }

    /// The event store path, falling back to the data directory.
    pub fn store_path(&self) -> PathBuf {
        self.local_store
            .clone()
            .unwrap_or_else(|| AssistantConfig::default_data_dir().join("events.json"))
    }

    /// Parses every setting and returns the first failure.
    pub fn validate(&self) -> AssistantResult<()> {
        if self.calendar_id.trim().is_empty() {
            return Err(AssistantError::Config(
                "calendar-id must not be empty".to_string(),
            ));
        }
        self.workday()?;
        self.meeting_length()?;
        self.time_zone()?;
        Ok(())
    }
}

impl AssistantConfig {
    /// Loads configuration from the default path.
    pub fn load() -> AssistantResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path. A missing file yields the
    /// defaults; a file that is not valid TOML is an error.
    pub fn load_from(path: &Path) -> AssistantResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AssistantError::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        Self::parse(&content)
            .map_err(|e| AssistantError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> AssistantResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AssistantError::Config(format!("failed to serialize config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}
