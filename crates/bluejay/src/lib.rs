//! Bluejay - multi-bot Bluesky reply orchestrator
//!
//! Bluejay runs several Bluesky accounts side by side. Each cycle, every bot
//! reads its mentions and replies (and optionally a keyword search), asks an
//! LLM classifier whether and how to answer, and either posts the reply,
//! queues it for human approval, or parks it for a later drain when its
//! posting budget is spent.
//!
//! # Architecture
//!
//! - `bluejay_error` - Error types
//! - `bluejay_core` - Data model (profiles, queue items, thread memory)
//! - `bluejay_interface` - Transport, classifier and store traits
//! - `bluejay_rate_limit` - Sliding-window limiters and retry policy
//! - `bluejay_security` - Content filter and approval policy
//! - `bluejay_database` - SQLite and in-memory stores
//! - `bluejay_social` - Bluesky XRPC transport
//! - `bluejay_models` - OpenAI-compatible classifier
//! - `bluejay_bot` - Worker, reply queue, runner and admin surface
//!
//! This crate re-exports the pieces an embedding application needs and adds
//! configuration loading ([`BluejayConfig`]), logging setup
//! ([`init_logging`]) and process assembly ([`App`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod config;
mod observability;

pub use app::{App, ConnectedBot, bind_admin, serve_admin, shutdown_signal};
pub use config::{AdminConfig, BluejayConfig, LoggingConfig, SettingsSection};
pub use observability::init_logging;

pub use bluejay_bot::{
    AdminService, ApiState, BotMetrics, BotRunner, BotWorker, CycleReport, CycleSummary,
    DrainReport, MetricsSnapshot, PostOutcome, ReplyQueue, create_router,
};
pub use bluejay_core::{
    BotProfile, Persona, QueueItem, QueueStatus, RateLimitConfig, RuntimeSettings, ThreadMemory,
};
pub use bluejay_error::{BluejayError, BluejayErrorKind, BluejayResult, ConfigError};
pub use bluejay_interface::{BotStore, Classifier, Transport};
pub use bluejay_security::{ApprovalMode, ApprovalPolicy, FilterPolicy};
