use std::fmt;
use thiserror::Error;

/// Result type for vecadmin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause retained inside transport and unclassified errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for vecadmin operations
///
/// Every collection operation resolves to a success value or exactly one of
/// these variants. Transport and unclassified failures keep their original
/// cause, reachable through [`std::error::Error::source`].
#[derive(Error, Debug)]
pub enum Error {
    /// Bad input shape or range, detected locally or reported by the service
    #[error("Validation error: {0}")]
    Validation(String),

    /// A collection with this name already exists
    #[error("Collection already exists: {0}")]
    AlreadyExists(String),

    /// No collection with this name exists
    #[error("Collection not found: {0}")]
    NotFound(String),

    /// No response arrived before the deadline elapsed
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Channel-level failure carrying an RPC status code
    #[error("Transport error (code {code}): {message}")]
    Transport {
        code: i32,
        message: String,
        #[source]
        source: BoxError,
    },

    /// Anything unclassified
    #[error("{context}: {source}")]
    Unknown {
        context: String,
        #[source]
        source: BoxError,
    },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`Error`] for callers that handle each kind distinctly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    AlreadyExists,
    NotFound,
    Timeout,
    Transport,
    Unknown,
    Config,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::AlreadyExists => "already_exists",
            Self::NotFound => "not_found",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Unknown => "unknown",
            Self::Config => "config",
            Self::Io => "io",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Creates a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates an already-exists error for a collection name
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists(name.into())
    }

    /// Creates a not-found error for a collection name
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Creates a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a transport error, keeping the status that caused it
    pub fn transport<E>(code: i32, message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport {
            code,
            message: message.into(),
            source: source.into(),
        }
    }

    /// Wraps an unclassified failure
    pub fn unknown<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Unknown {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Unknown { .. } => ErrorKind::Unknown,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// RPC status code preserved on transport errors
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Wrap a foreign error as an unclassified failure with context
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::unknown(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Error::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(Error::already_exists("c").kind(), ErrorKind::AlreadyExists);
        assert_eq!(Error::not_found("c").kind(), ErrorKind::NotFound);
        assert_eq!(Error::timeout("create", 10).kind(), ErrorKind::Timeout);
        assert_eq!(Error::config("bad").kind(), ErrorKind::Config);
    }

    #[test]
    fn test_transport_preserves_code_and_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = Error::transport(14, "unavailable", cause);

        assert_eq!(err.status_code(), Some(14));
        assert_eq!(err.kind(), ErrorKind::Transport);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("reset by peer"));
    }

    #[test]
    fn test_context_wraps_as_unknown() {
        let parsed: std::result::Result<u32, _> = "abc".parse::<u32>();
        let err = parsed.context("Failed to parse count").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.to_string().starts_with("Failed to parse count"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_status_code_absent_for_domain_errors() {
        assert_eq!(Error::not_found("c").status_code(), None);
    }
}
