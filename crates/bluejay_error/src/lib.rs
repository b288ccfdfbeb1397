//! Error types for the Bluejay bot engine.
//!
//! This crate provides the error taxonomy shared by every Bluejay crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! The taxonomy mirrors how the engine reacts to a failure:
//! - [`TransportError`] with [`TransportErrorKind::NotFound`] is permanent (the
//!   target content is gone); every other transport failure is retried later.
//! - [`ClassifierError`] never reaches the outer loop; workers degrade to
//!   "do not reply".
//! - [`ConfigError`] is fatal at startup only.
//!
//! # Examples
//!
//! ```
//! use bluejay_error::{BluejayResult, TransportError, TransportErrorKind};
//!
//! fn post() -> BluejayResult<()> {
//!     Err(TransportError::new(TransportErrorKind::NotFound("at://gone".into())))?
//! }
//!
//! assert!(post().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classifier;
mod config;
mod database;
mod error;
mod queue;
mod transport;

pub use classifier::{ClassifierError, ClassifierErrorKind};
pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{BluejayError, BluejayErrorKind, BluejayResult};
pub use queue::{QueueError, QueueErrorKind};
pub use transport::{TransportError, TransportErrorKind};
