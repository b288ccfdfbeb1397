//! Command-line interface.

mod commands;
mod handlers;

pub use commands::{Cli, Commands, QueueCommands};
pub use handlers::{handle_approval, handle_drain, handle_queue, run_admin, run_bots};
