//! Top-level error wrapper types.

use crate::{ClassifierError, ConfigError, DatabaseError, QueueError, TransportError};

/// Every error condition a Bluejay operation can report.
///
/// # Examples
///
/// ```
/// use bluejay_error::{BluejayError, ConfigError};
///
/// let err: BluejayError = ConfigError::new("no bots configured").into();
/// assert!(format!("{}", err).contains("no bots configured"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum BluejayErrorKind {
    /// Social network transport error
    #[from(TransportError)]
    Transport(TransportError),
    /// Classification service error
    #[from(ClassifierError)]
    Classifier(ClassifierError),
    /// Durable store error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Reply queue administration error
    #[from(QueueError)]
    Queue(QueueError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Bluejay error with kind discrimination.
///
/// # Examples
///
/// ```
/// use bluejay_error::{BluejayErrorKind, BluejayResult, TransportError};
///
/// fn post() -> BluejayResult<()> {
///     Err(TransportError::transient("connection reset"))?
/// }
///
/// let err = post().unwrap_err();
/// assert!(matches!(err.kind(), BluejayErrorKind::Transport(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Bluejay Error: {}", _0)]
pub struct BluejayError(Box<BluejayErrorKind>);

impl BluejayError {
    /// Create a new error from a kind.
    pub fn new(kind: BluejayErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BluejayErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to BluejayErrorKind
impl<T> From<T> for BluejayError
where
    T: Into<BluejayErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Bluejay operations.
pub type BluejayResult<T> = std::result::Result<T, BluejayError>;
