//! Error types for the console API client.
//!
//! # Design
//! Two families of failure reach the caller. An `Application` error means the
//! backend answered with `status: "error"` in its envelope. Everything else
//! (network, timeout, non-2xx without an error envelope, undecodable body) is
//! a transport-level failure. Both are surfaced to the user through the same
//! notifier using `notification_text`.

use thiserror::Error;

/// Text shown to the user when a failure carries no message of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "fail to request";

/// Boxed error produced by a `Transport` implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `ApiClient` and the resource clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend returned an error envelope; displays as its message.
    #[error("{message}")]
    Application { message: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// The server returned a non-2xx status without an error envelope.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Build an application error, substituting the default text for a
    /// missing or empty message.
    pub fn application(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        ApiError::Application { message }
    }

    /// True for network, HTTP-status and response-decoding failures. Errors
    /// raised before a request is sent (`InvalidUrl`, `SerializationError`,
    /// `Config`) and application errors are not transport failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::HttpError { .. } | ApiError::DeserializationError(_)
        )
    }

    /// User-facing text for the error notification.
    pub fn notification_text(&self) -> String {
        let text = match self {
            ApiError::Application { message } => message.clone(),
            ApiError::Transport(source) => source.to_string(),
            other => other.to_string(),
        };
        if text.is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Silent;

    impl std::fmt::Display for Silent {
        fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Ok(())
        }
    }

    impl std::error::Error for Silent {}

    #[test]
    fn application_error_displays_message_verbatim() {
        let err = ApiError::application(Some("Record not found".to_string()));
        assert_eq!(err.to_string(), "Record not found");
        assert_eq!(err.notification_text(), "Record not found");
        assert!(!err.is_transport());
    }

    #[test]
    fn application_error_defaults_missing_message() {
        assert_eq!(ApiError::application(None).to_string(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(
            ApiError::application(Some(String::new())).to_string(),
            DEFAULT_ERROR_MESSAGE
        );
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out");
        let err = ApiError::Transport(Box::new(io));
        assert!(err.is_transport());
        assert_eq!(err.notification_text(), "operation timed out");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "operation timed out");
    }

    #[test]
    fn transport_error_without_message_uses_default() {
        let err = ApiError::Transport(Box::new(Silent));
        assert_eq!(err.notification_text(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn http_error_display() {
        let err = ApiError::HttpError {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.notification_text(), "HTTP 502: bad gateway");
    }

    #[test]
    fn local_failures_are_not_transport() {
        assert!(ApiError::DeserializationError("eof".to_string()).is_transport());
        assert!(!ApiError::InvalidUrl("nowhere".to_string()).is_transport());
        assert!(!ApiError::SerializationError("bad key".to_string()).is_transport());
        assert!(!ApiError::Config("bad timeout".to_string()).is_transport());
        assert!(!ApiError::application(None).is_transport());
    }
}
