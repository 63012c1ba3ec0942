//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SettingsOverrides;

const DEFAULT_DATESPEC: &str = "today";

/// calendar-assistant - location markers and availability on your calendar
#[derive(Debug, Parser)]
#[command(name = "calendar-assistant")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, env = "CALENDAR_ASSISTANT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Read and write events in this JSON file
    #[arg(long, value_name = "FILE", global = true)]
    pub local_store: Option<PathBuf>,

    /// Calendar id to use
    #[arg(long, value_name = "ID", global = true)]
    pub calendar: Option<String>,

    /// Time zone for dates and workday bounds (IANA name)
    #[arg(long, value_name = "TZ", global = true)]
    pub timezone: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Returns the settings given on the command line.
    pub fn overrides(&self) -> SettingsOverrides {
        let mut overrides = SettingsOverrides {
            calendar_id: self.calendar.clone(),
            timezone: self.timezone.clone(),
            local_store: self.local_store.clone(),
            ..Default::default()
        };
        if let Some(Command::Availability {
            meeting_length,
            start_of_day,
            end_of_day,
            ..
        }) = &self.command
        {
            overrides.meeting_length = meeting_length.clone();
            overrides.start_of_day = start_of_day.clone();
            overrides.end_of_day = end_of_day.clone();
        }
        overrides
    }

    /// Returns the subcommand, defaulting to `show today`.
    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or(Command::Show {
            datespec: DEFAULT_DATESPEC.to_string(),
            commitments: false,
        })
    }
}

/// Available commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show your events for a date or range of dates
    Show {
        /// DATE or DATE...DATE
        #[arg(default_value = DEFAULT_DATESPEC)]
        datespec: String,

        /// Only show events you have accepted with another person
        #[arg(long, short)]
        commitments: bool,
    },

    /// Show your location for a date or range of dates
    Location {
        /// DATE or DATE...DATE
        #[arg(default_value = DEFAULT_DATESPEC)]
        datespec: String,
    },

    /// Set your location for a date or range of dates
    LocationSet {
        /// Where you will be
        location: String,

        /// DATE or DATE...DATE
        #[arg(default_value = DEFAULT_DATESPEC)]
        datespec: String,
    },

    /// Show your free time for a date or range of dates
    Availability {
        /// DATE or DATE...DATE
        #[arg(default_value = DEFAULT_DATESPEC)]
        datespec: String,

        /// Only show blocks at least this long (`30m`, `2h`, `1h30m`)
        #[arg(long, short = 'l', value_name = "LENGTH")]
        meeting_length: Option<String>,

        /// Start of the workday (`9am`, `14:30`)
        #[arg(long, short = 's', value_name = "TIME")]
        start_of_day: Option<String>,

        /// End of the workday (`6pm`, `17:30`)
        #[arg(long, short = 'e', value_name = "TIME")]
        end_of_day: Option<String>,
    },

    /// Open the video call of the meeting running now or at TIME
    Join {
        /// `now`, TIME, or `YYYY-MM-DD HH:MM`
        #[arg(default_value = "now")]
        time: String,

        /// Print the link without opening a browser
        #[arg(long)]
        no_join: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Dump the merged configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
