//! Core data types for the Bluejay bot orchestration engine.
//!
//! This crate provides the data model shared by every Bluejay crate: bot
//! profiles and their rule sets, inbound items, queue items and their status
//! machine, per-user thread memory, and classifier request/response types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bot;
mod classification;
mod item;
mod memory;
mod queue;
mod settings;
mod text;

pub use bot::{BotProfile, BotProfileBuilder, Persona, RateLimitConfig, ReplyRules, RuleSet};
pub use classification::{Classification, ClassificationRequest};
pub use item::{Candidate, NotificationItem, NotificationReason, PostReceipt, ReplySource};
pub use memory::{Interaction, MAX_HISTORY, ThreadMemory};
pub use queue::{NewQueueItem, QueueItem, QueueStatus};
pub use settings::RuntimeSettings;
pub use text::truncate_chars;
