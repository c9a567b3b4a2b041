use crate::context::AppContext;
use anyhow::{Result, bail};
use chrono::Local;
use herald_core::broadcast::{RunOutcome, RunSummary};
use herald_core::recipient::RecipientKind;
use herald_core::{LogEntry, LogStatus};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;

pub struct SendArgs {
    pub message: String,
    pub to: Vec<String>,
    pub all_individuals: bool,
    pub all_groups: bool,
    pub delay: Option<u64>,
}

pub async fn run(ctx: &AppContext, args: SendArgs) -> Result<()> {
    ctx.bootstrap().await?;

    let summary = ctx.catalog.fetch().await?;
    for (kind, result) in [
        (RecipientKind::Individual, &summary.individuals),
        (RecipientKind::Group, &summary.groups),
    ] {
        if let Err(e) = result {
            eprintln!("Could not load {} list: {}", kind, e);
        }
    }

    if args.all_individuals {
        ctx.catalog.select_all(RecipientKind::Individual);
    }
    if args.all_groups {
        ctx.catalog.select_all(RecipientKind::Group);
    }
    for id in &args.to {
        if !ctx.catalog.is_selected(id) {
            ctx.catalog.toggle_selection(id);
        }
    }

    let recipients = ctx.catalog.selected_recipients();
    if recipients.len() < ctx.catalog.selection().len() {
        eprintln!("Some requested ids are not in your recipient lists and were skipped.");
    }
    if recipients.is_empty() {
        bail!("No recipients selected; use --to, --all-individuals or --all-groups");
    }

    let delay = args
        .delay
        .unwrap_or(ctx.config.broadcast.default_delay_secs);

    let mut feed = ctx.log.subscribe();
    let handle = ctx.dispatcher.start(recipients, &args.message, delay).await?;
    eprintln!("Press Ctrl-C to stop after the current send.");

    let (outcome, summary) = follow_run(
        handle.wait(),
        &mut feed,
        tokio::signal::ctrl_c(),
        || {
            ctx.dispatcher.stop();
            eprintln!("Stopping after the current send...");
        },
    )
    .await?;

    while let Ok(entry) = feed.try_recv() {
        print_entry(&entry);
    }

    println!(
        "{} sent, {} failed, {} of {} attempted",
        summary.sent,
        summary.failed,
        summary.attempted(),
        summary.total
    );
    if outcome == RunOutcome::Stopped {
        println!("Run was stopped before reaching every recipient.");
    }
    Ok(())
}

/// Prints the status feed until `run` resolves.
///
/// `interrupt` is created once and pinned for the whole run, so a signal
/// that lands while an entry is being printed is still seen. `on_interrupt`
/// runs at most once.
async fn follow_run<R, I, T>(
    run: R,
    feed: &mut Receiver<LogEntry>,
    interrupt: I,
    mut on_interrupt: impl FnMut(),
) -> Result<(RunOutcome, RunSummary)>
where
    R: Future<Output = herald_core::Result<(RunOutcome, RunSummary)>>,
    I: Future<Output = T>,
{
    tokio::pin!(run);
    tokio::pin!(interrupt);
    let mut interrupted = false;

    loop {
        tokio::select! {
            finished = &mut run => return Ok(finished?),
            entry = feed.recv() => match entry {
                Ok(entry) => print_entry(&entry),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Send] Status feed skipped {} entries", skipped);
                }
                Err(RecvError::Closed) => {}
            },
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                on_interrupt();
            }
        }
    }
}

fn print_entry(entry: &LogEntry) {
    println!(
        "[{}] {:<7} {}",
        entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        status_label(entry.status),
        entry.text
    );
}

fn status_label(status: LogStatus) -> &'static str {
    match status {
        LogStatus::Pending => "pending",
        LogStatus::Success => "ok",
        LogStatus::Error => "error",
        LogStatus::Info => "info",
    }
}
