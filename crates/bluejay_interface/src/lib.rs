//! Trait definitions for the Bluejay bot engine.
//!
//! The orchestration core talks to three collaborators, all behind traits so
//! they can be swapped for mocks in tests:
//!
//! - [`Transport`]: the social network (notifications, search, posting)
//! - [`Classifier`]: the reply classification/generation service
//! - [`BotStore`]: the durable store, split into one trait per relation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborators;
mod store;
mod types;

pub use collaborators::{Classifier, Transport};
pub use store::{ActionLog, BotStore, MemoryStore, ReplyQueueStore, SeenLedger, StateStore};
pub use types::{ActionEntry, QueueFilter};
