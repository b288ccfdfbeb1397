//! Command handlers.

use super::commands::QueueCommands;
use bluejay::{
    ApiState, App, ApprovalMode, BluejayConfig, BluejayResult, BotMetrics, BotRunner,
    ConfigError, QueueItem, ReplyQueue, bind_admin, serve_admin, shutdown_signal,
};
use bluejay_error::{QueueError, QueueErrorKind};
use bluejay_interface::ReplyQueueStore;
use bluejay_rate_limit::PostingLimiter;
use std::sync::Arc;
use tracing::error;

/// `bluejay run`: log every bot in and loop until Ctrl-C.
pub async fn run_bots(config: BluejayConfig, once: bool, dry_run: bool) -> BluejayResult<()> {
    config.validate()?;
    let app = App::open(config, dry_run)?;
    let connected = app.connect_all().await?;
    let classifier = app.classifier()?;
    let workers = app.workers(&connected, classifier)?;
    let metrics = BotMetrics::new();
    let runner = BotRunner::new(workers, &app.config().settings.runtime, metrics.clone())?;

    if once {
        let summary = runner.run_cycle().await;
        println!(
            "Cycle finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        );
        return Ok(());
    }

    let admin_task = match &app.config().admin.bind {
        Some(bind) => {
            let listener = bind_admin(bind).await?;
            let state = ApiState::new(Arc::new(app.admin(&connected)), metrics);
            Some(tokio::spawn(serve_admin(listener, state, shutdown_signal())))
        }
        None => None,
    };

    runner.run(shutdown_signal()).await;

    if let Some(task) = admin_task {
        // The server saw the same Ctrl-C.
        if let Err(e) = task.await {
            error!(error = %e, "Admin server task panicked");
        }
    }
    Ok(())
}

/// `bluejay admin`: serve the admin surface without running any bot.
pub async fn run_admin(config: BluejayConfig) -> BluejayResult<()> {
    let bind = config
        .admin
        .bind
        .clone()
        .ok_or_else(|| ConfigError::new("admin.bind is not configured"))?;
    let app = App::open(config, false)?;
    let connected = app.connect_all().await?;
    let state = ApiState::new(Arc::new(app.admin(&connected)), BotMetrics::new());
    let listener = bind_admin(&bind).await?;
    serve_admin(listener, state, shutdown_signal()).await;
    Ok(())
}

/// `bluejay drain`: post queued retry items for one or every bot.
pub async fn handle_drain(
    config: BluejayConfig,
    bot: Option<String>,
    max: Option<usize>,
) -> BluejayResult<()> {
    let app = App::open(config, false)?;
    let bots = match bot {
        Some(handle) => vec![app.bot(&handle)?.clone()],
        None => app.config().bots.clone(),
    };
    let max = max.unwrap_or(*app.config().settings.runtime.drain_batch_size());
    let queue = ReplyQueue::new(app.store());

    for profile in bots {
        let transport = app.connect(&profile).await?;
        let limiter = PostingLimiter::new(*profile.rate_limit());
        let report = queue
            .drain(profile.handle(), transport.as_ref(), &limiter, max)
            .await?;
        println!(
            "{}: posted {}, gone {}, skipped {}{}",
            profile.handle(),
            report.posted,
            report.gone,
            report.skipped,
            report
                .stopped
                .map(|stop| format!(" (stopped: {:?})", stop))
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// `bluejay queue ...`
pub async fn handle_queue(config: BluejayConfig, cmd: QueueCommands) -> BluejayResult<()> {
    let app = App::open(config, false)?;
    match cmd {
        QueueCommands::List { status } => {
            let items = app.admin(&[]).list_queue(status).await?;
            println!("{:-<80}", "");
            for item in &items {
                print_item(item);
                println!("{:-<80}", "");
            }
            println!("Total: {} items", items.len());
        }
        QueueCommands::Approve { id } => {
            let item = app
                .store()
                .get_item(id)
                .await?
                .ok_or_else(|| QueueError::new(QueueErrorKind::ItemNotFound(id)))?;
            let profile = app.bot(item.bot_handle())?.clone();
            let transport = app.connect(&profile).await?;
            let item = app.admin(&[(profile, transport)]).approve(id).await?;
            println!("Approved and posted #{}", item.id());
        }
        QueueCommands::Reject { id } => {
            let item = app.admin(&[]).reject(id).await?;
            println!("Rejected #{}", item.id());
        }
    }
    Ok(())
}

/// `bluejay approval <handle> <on|off>`
pub async fn handle_approval(
    config: BluejayConfig,
    handle: String,
    mode: ApprovalMode,
) -> BluejayResult<()> {
    let app = App::open(config, false)?;
    let admin = app.admin(&[]);
    admin.set_approval_mode(&handle, mode).await?;
    let on = admin.approval_mode(&handle).await?;
    println!(
        "Approval mode for {} is now {}",
        handle,
        if on { "on" } else { "off" }
    );
    Ok(())
}

fn print_item(item: &QueueItem) {
    println!(
        "#{} [{}] {} via {} at {}",
        item.id(),
        item.status(),
        item.bot_handle(),
        item.source(),
        item.created_at().to_rfc3339()
    );
    println!("  to {} ({})", item.author_handle(), item.parent_uri());
    println!("  > {}", item.post_text());
    println!("  < {}", item.reply_text());
}
