//! Error types
//!
//! Every failure is reported to the immediate caller as a tagged
//! `(kind, message)` pair. Kinds carry stable codes so they survive the
//! trip across the method channel.

use std::fmt;

/// Category of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Resource did not resolve, permission denied, or the open call faulted
    OpenFailed,
    /// Resource resolved but produced no stream, or no handle is open
    NoStream,
    /// A handle is already open and duplicate opens are rejected
    AlreadyOpen,
    /// Resource length could not be determined
    SizeUnavailable,
    /// Resource length query faulted
    SizeQueryFailed,
    /// Read on an open handle faulted
    ReadFailed,
    /// Releasing a handle faulted
    CloseFailed,
    /// Unrecognized method name
    NotImplemented,
    /// Missing or mistyped argument
    InvalidArgument,
    /// Call exceeded the transport deadline
    Timeout,
    /// The channel server is gone
    ChannelClosed,
}

impl ErrorKind {
    /// Stable wire code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::OpenFailed => "open-failed",
            ErrorKind::NoStream => "no-stream",
            ErrorKind::AlreadyOpen => "already-open",
            ErrorKind::SizeUnavailable => "size-unavailable",
            ErrorKind::SizeQueryFailed => "size-query-failed",
            ErrorKind::ReadFailed => "read-failed",
            ErrorKind::CloseFailed => "close-failed",
            ErrorKind::NotImplemented => "not-implemented",
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ChannelClosed => "channel-closed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned by registry, bridge and channel operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    kind: ErrorKind,
    message: String,
}

impl StreamError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Wrap an underlying I/O error, keeping its message
    pub fn io(kind: ErrorKind, err: &std::io::Error) -> Self {
        Self::new(kind, err.to_string())
    }

    pub fn no_stream(resource: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::NoStream,
            format!("Stream not opened for {}", resource),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Error category
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable detail (the underlying message for I/O faults)
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StreamError {}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_message() {
        let err = StreamError::new(ErrorKind::ReadFailed, "disk went away");
        assert_eq!(err.to_string(), "read-failed: disk went away");
    }

    #[test]
    fn test_io_keeps_underlying_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no grant");
        let err = StreamError::io(ErrorKind::OpenFailed, &io);

        assert_eq!(err.kind(), ErrorKind::OpenFailed);
        assert_eq!(err.message(), "no grant");
    }

    #[test]
    fn test_codes_are_distinct() {
        let kinds = [
            ErrorKind::OpenFailed,
            ErrorKind::NoStream,
            ErrorKind::AlreadyOpen,
            ErrorKind::SizeUnavailable,
            ErrorKind::SizeQueryFailed,
            ErrorKind::ReadFailed,
            ErrorKind::CloseFailed,
            ErrorKind::NotImplemented,
            ErrorKind::InvalidArgument,
            ErrorKind::Timeout,
            ErrorKind::ChannelClosed,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
