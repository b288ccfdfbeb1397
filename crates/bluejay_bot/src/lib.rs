//! Reply orchestration for Bluejay bots.
//!
//! One [`BotWorker`] per account runs the cycle: drain rate-limited replies,
//! answer mentions and replies, then optionally answer keyword search
//! results. [`BotRunner`] schedules the workers and keeps one bot's failure
//! from stopping the others. [`AdminService`] and [`create_router`] expose
//! the human side of the reply queue.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod admin;
mod api;
mod metrics;
mod persona;
mod queue;
mod runner;
mod worker;

pub use admin::AdminService;
pub use api::{ApiState, create_router};
pub use metrics::{BotMetrics, MetricsSnapshot};
pub use persona::{PERSONA_EMOJI, apply_persona};
pub use queue::{DrainReport, DrainStop, ReplyQueue};
pub use runner::{BotRunner, CycleSummary};
pub use worker::{BotWorker, BotWorkerBuilder, CycleReport, PostOutcome};
