//! Client error types.

use calassist_core::{CoreError, LocationChanges};
use calassist_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type AssistantResult<T> = Result<T, AssistantError>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Invalid interval or workday configuration, raised before any write.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Transport failure, passed through unchanged.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration file could not be read or holds a bad setting.
    #[error("configuration error: {0}")]
    Config(String),

    /// A date, time or duration argument could not be understood.
    #[error("could not parse {what} '{input}'")]
    Parse { what: &'static str, input: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The browser could not be started for a call link.
    #[error("failed to open {url}: {source}")]
    Launch {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// A transport call failed after the new marker was created. The
    /// calendar now holds exactly the edits in `committed`.
    #[error("location change stopped after {} committed edit(s): {source}", committed.len())]
    PartialReconciliation {
        committed: LocationChanges,
        #[source]
        source: ProviderError,
    },
}

impl AssistantError {
    pub(crate) fn parse(what: &'static str, input: impl Into<String>) -> Self {
        Self::Parse {
            what,
            input: input.into(),
        }
    }

    /// Returns the edits that reached the calendar before a failure, if the
    /// failure interrupted a location change.
    pub fn committed(&self) -> Option<&LocationChanges> {
        match self {
            Self::PartialReconciliation { committed, .. } => Some(committed),
            _ => None,
        }
    }
}
