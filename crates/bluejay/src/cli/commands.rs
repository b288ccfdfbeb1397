//! CLI command definitions.

use bluejay::{ApprovalMode, QueueStatus};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bluejay - multi-bot Bluesky reply orchestrator
#[derive(Parser, Debug)]
#[command(name = "bluejay")]
#[command(about = "Multi-bot Bluesky reply orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "bluejay.toml")]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start every configured bot (and the admin server when configured)
    Run {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Read for real but never post; state is kept in memory
        #[arg(long)]
        dry_run: bool,
    },

    /// Drain queued retry items outside the main loop
    Drain {
        /// Only drain this bot
        #[arg(long)]
        bot: Option<String>,

        /// Maximum items per bot (defaults to `settings.drain_batch_size`)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Inspect and moderate the reply queue
    #[command(subcommand)]
    Queue(QueueCommands),

    /// Override a bot's approval mode
    Approval {
        /// Bot handle
        handle: String,

        /// `on` or `off`
        mode: ApprovalMode,
    },

    /// Serve only the admin HTTP surface
    Admin,
}

/// Reply queue subcommands
#[derive(Subcommand, Debug)]
pub enum QueueCommands {
    /// List queued replies
    List {
        /// Status filter (pending, retry, posted, approved-posted, rejected, gone)
        #[arg(long)]
        status: Option<QueueStatus>,
    },

    /// Post a pending reply
    Approve {
        /// Queue item id
        id: i64,
    },

    /// Reject a pending reply
    Reject {
        /// Queue item id
        id: i64,
    },
}
