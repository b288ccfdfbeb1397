//! Reply queue administration error types.

/// Kinds of queue errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum QueueErrorKind {
    /// No queue item with this id
    #[display("Queue item {} not found", _0)]
    ItemNotFound(i64),
    /// The item is not in the state the action requires
    #[display("Queue item {} cannot move from {} to {}", id, from, to)]
    InvalidTransition {
        /// Queue item id
        id: i64,
        /// Status the item is actually in
        from: String,
        /// Status the action wanted to reach
        to: String,
    },
    /// The item belongs to a bot this process does not run
    #[display("Unknown bot: {}", _0)]
    UnknownBot(String),
}

/// Queue error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Queue Error: {} at line {} in {}", kind, line, file)]
pub struct QueueError {
    /// The kind of error that occurred
    pub kind: QueueErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl QueueError {
    /// Create a new queue error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: QueueErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
