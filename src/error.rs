//! Fault types shared by both iteration protocols.
//!
//! Every pull returns `Result<Step<T>, SeqError>`. The variant records where the
//! fault originated so a consumer can tell a failing callback from a failing
//! source or a failing cleanup.

use thiserror::Error;

/// Boxed error accepted from user callbacks and sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience type alias for Results using [`SeqError`].
pub type Result<T, E = SeqError> = std::result::Result<T, E>;

/// Faults surfaced by cursors, operators and terminal operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeqError {
    /// A user-supplied transform, predicate or reducer failed.
    #[error("callback failed: {0}")]
    Callback(#[source] BoxError),

    /// The underlying source failed to produce a value.
    #[error("source failed: {0}")]
    Source(#[source] BoxError),

    /// Releasing an upstream resource failed.
    #[error("cleanup failed: {0}")]
    Cleanup(#[source] BoxError),

    /// A single-use sequence was asked for a second cursor.
    #[error("single-use sequence was already iterated")]
    AlreadyIterated,
}

impl SeqError {
    /// Wrap a callback failure.
    pub fn callback(err: impl Into<BoxError>) -> Self {
        Self::Callback(err.into())
    }

    /// Wrap a source failure.
    pub fn source(err: impl Into<BoxError>) -> Self {
        Self::Source(err.into())
    }

    /// Wrap a cleanup failure.
    pub fn cleanup(err: impl Into<BoxError>) -> Self {
        Self::Cleanup(err.into())
    }

    /// Returns `true` for [`SeqError::Callback`].
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }

    /// Returns `true` for [`SeqError::Source`].
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }

    /// Returns `true` for [`SeqError::Cleanup`].
    pub fn is_cleanup(&self) -> bool {
        matches!(self, Self::Cleanup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_includes_origin() {
        let err = SeqError::callback("boom");
        assert_eq!(err.to_string(), "callback failed: boom");
        assert!(err.is_callback());

        let err = SeqError::cleanup("disk gone");
        assert_eq!(err.to_string(), "cleanup failed: disk gone");
        assert!(err.is_cleanup());
    }

    #[test]
    fn test_source_chain_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket reset");
        let err = SeqError::source(io);
        assert!(err.is_source());
        let inner = err.source().expect("source error is kept");
        assert_eq!(inner.to_string(), "socket reset");
    }
}
