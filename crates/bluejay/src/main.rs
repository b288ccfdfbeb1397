//! Bluejay CLI binary.
//!
//! - Run every configured bot in a loop (or once)
//! - Drain and moderate the reply queue
//! - Serve the admin HTTP surface

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use bluejay::{BluejayConfig, init_logging};
    use cli::{
        Cli, Commands, handle_approval, handle_drain, handle_queue, run_admin, run_bots,
    };

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BluejayConfig::load(&cli.config)?;
    init_logging(cli.json_logs || config.logging.json)?;

    match cli.command {
        Commands::Run { once, dry_run } => run_bots(config, once, dry_run).await?,
        Commands::Drain { bot, max } => handle_drain(config, bot, max).await?,
        Commands::Queue(queue_cmd) => handle_queue(config, queue_cmd).await?,
        Commands::Approval { handle, mode } => handle_approval(config, handle, mode).await?,
        Commands::Admin => run_admin(config).await?,
    }

    Ok(())
}
