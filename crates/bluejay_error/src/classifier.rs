//! Classification service error types.

/// Kinds of classifier errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ClassifierErrorKind {
    /// Request never reached the service or the connection dropped.
    #[display("HTTP error: {}", _0)]
    Http(String),
    /// Service answered with a non-success status.
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },
    /// The overall time budget for the call ran out.
    #[display("Classification timed out after {}s", _0)]
    Timeout(u64),
    /// Every attempt allowed by the retry policy failed.
    #[display("Classification failed after {} attempts", attempts)]
    Exhausted {
        /// Attempts made
        attempts: u32,
    },
}

impl ClassifierErrorKind {
    /// Whether another attempt might succeed.
    ///
    /// Connection failures, rate limiting (429) and server errors (5xx) are
    /// retryable; other client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout(_) | Self::Exhausted { .. } => false,
        }
    }
}

/// Classifier error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Classifier Error: {} at line {} in {}", kind, line, file)]
pub struct ClassifierError {
    /// The kind of error that occurred
    pub kind: ClassifierErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ClassifierError {
    /// Create a new classifier error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ClassifierErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
