//! Errors raised by calendar transports and the event repository.
//!
//! Callers distinguish two cases. A [`ProviderErrorCode::NotFound`] error
//! means an update or delete named an event id the calendar no longer has;
//! anything else is a remote-service failure. Nothing here retries.

use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// What went wrong, independent of the transport that reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Event or calendar id unknown to the store.
    NotFound,
    /// A remote store could not be reached.
    NetworkError,
    /// The store accepted the request and then failed it.
    ServerError,
    /// Stored data did not decode.
    InvalidResponse,
    /// The request itself was malformed, e.g. a write without an id.
    BadRequest,
    /// A local store file could not be read or written.
    StorageError,
    InternalError,
}

impl ProviderErrorCode {
    /// Stable snake_case identifier, used in messages and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::BadRequest => "bad_request",
            Self::StorageError => "storage_error",
            Self::InternalError => "internal_error",
        }
    }

    /// Transient failures. Informational only.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NetworkError | Self::ServerError)
    }
}

impl std::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by a calendar transport, displayed as
/// `[provider] code: message`.
#[derive(Debug, Error)]
#[error("{}{code}: {message}", provider_prefix(.provider.as_deref()))]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    provider: Option<String>,
    #[source]
    source: Option<BoxedCause>,
}

fn provider_prefix(provider: Option<&str>) -> String {
    provider.map(|name| format!("[{}] ", name)).unwrap_or_default()
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// The store is unreachable or an I/O operation on it failed.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Reading or writing a local store file failed.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::StorageError, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    pub fn event_not_found(calendar_id: &str, event_id: &str) -> Self {
        Self::not_found(format!(
            "event {} not found in calendar {}",
            event_id, calendar_id
        ))
    }

    #[must_use]
    pub fn with_provider(self, provider: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_source<E>(self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            source: Some(Box::new(cause)),
            ..self
        }
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the reporting transport (`memory`, `local`, ...).
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ProviderErrorCode::NotFound
    }

    pub fn is_remote_service_error(&self) -> bool {
        !self.is_not_found()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

/// Result type for transport and repository operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn missing_event_vs_service_failure() {
        let missing = ProviderError::event_not_found("primary", "evt-1");
        assert!(missing.is_not_found());
        assert!(!missing.is_remote_service_error());
        assert!(!missing.is_retryable());
        assert_eq!(missing.message(), "event evt-1 not found in calendar primary");

        let down = ProviderError::server("backend unavailable");
        assert!(down.is_remote_service_error());
        assert!(down.is_retryable());
        assert!(!ProviderError::invalid_response("bad json").is_retryable());

        let disk = ProviderError::storage("permission denied");
        assert!(disk.is_remote_service_error());
        assert!(!disk.is_retryable());
        assert_eq!(disk.to_string(), "storage_error: permission denied");
    }

    #[test]
    fn display() {
        let err = ProviderError::network("connection reset").with_provider("local");
        assert_eq!(err.to_string(), "[local] network_error: connection reset");
        assert_eq!(err.provider(), Some("local"));
        assert_eq!(
            ProviderError::bad_request("no id").to_string(),
            "bad_request: no id"
        );
    }

    #[test]
    fn keeps_cause() {
        let err = ProviderError::network("write failed")
            .with_source(std::io::Error::other("disk full"));
        assert_eq!(err.source().map(|e| e.to_string()).as_deref(), Some("disk full"));
        assert!(ProviderError::internal("oops").source().is_none());
    }
}
