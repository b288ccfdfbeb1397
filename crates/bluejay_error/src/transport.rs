//! Social network transport error types.

/// Kinds of transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// Target content no longer exists (deleted, blocked or unavailable).
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Network or service hiccup; worth retrying on a later cycle.
    #[display("Transient failure: {}", _0)]
    Transient(String),
    /// Login failed or the session could not be refreshed.
    #[display("Authentication failed: {}", _0)]
    Authentication(String),
    /// The service answered with a payload we could not understand.
    #[display("Invalid response: {}", _0)]
    InvalidResponse(String),
}

/// Transport error with location tracking.
///
/// # Examples
///
/// ```
/// use bluejay_error::{TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::NotFound("at://did/post/1".into()));
/// assert!(err.is_not_found());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    /// The kind of error that occurred
    pub kind: TransportErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransportError {
    /// Create a new transport error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a transient failure.
    #[track_caller]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Transient(message.into()))
    }

    /// Shorthand for a not-found failure.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NotFound(message.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TransportErrorKind {
        &self.kind
    }

    /// Whether the target content is permanently gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, TransportErrorKind::NotFound(_))
    }
}
