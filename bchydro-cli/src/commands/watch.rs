//! Watch command - poll on an interval and redraw.

use std::io::{stdout, Write};

use anyhow::Result;
use bchydro_portal::ReportState;
use clap::Args;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use super::{build_cycle, load_config};
use crate::output::{ErrorOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured interval).
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Minimum interval to use.
    #[arg(long, default_value = "30")]
    pub min_interval: u64,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;
    let refresh_interval = args
        .interval
        .map_or_else(|| config.refresh_interval(), Duration::from_secs)
        .max(Duration::from_secs(args.min_interval));

    let cycle = build_cycle(&config)?;
    info!(interval = refresh_interval.as_secs(), "Starting watch mode");

    let mut ticker = interval(refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                return Ok(());
            }
        }

        if let Err(e) = cycle.refresh().await {
            warn!(error = %e, disposition = ?e.disposition(), "Cycle failed");
        }

        let state = cycle.subscribe().borrow().clone();
        render(&state, refresh_interval, cli)?;
    }
}

/// True if the report failed its last refresh or has missed two ticks.
fn is_aging(state: &ReportState, refresh_interval: Duration) -> bool {
    let threshold = chrono::Duration::from_std(refresh_interval * 2).unwrap_or(chrono::Duration::MAX);
    state.stale || state.report.as_ref().is_some_and(|r| r.is_stale(threshold))
}

fn render(state: &ReportState, refresh_interval: Duration, cli: &Cli) -> Result<()> {
    let stale = is_aging(state, refresh_interval);
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            // Clear screen
            print!("\x1b[2J\x1b[H");
            stdout().flush()?;

            let now = chrono::Local::now();
            println!(
                "BC Hydro Watch Mode - {} (refresh: {}s)",
                now.format("%H:%M:%S"),
                refresh_interval.as_secs()
            );
            println!();

            if let Some(report) = &state.report {
                println!(
                    "{}",
                    formatter.format_report(report, state.subscriber_id.as_deref(), stale)
                );
            }
            if let Some(error) = &state.last_error {
                println!();
                println!("{}", formatter.format_error("Last refresh", error));
            }

            println!();
            println!("Press Ctrl+C to exit");
        }
        OutputFormat::Json => {
            // One document per line
            let formatter = JsonFormatter::new(false);
            let line = match &state.report {
                Some(report) => formatter.format_report(
                    report,
                    state.subscriber_id.as_deref(),
                    stale,
                    state.last_error.as_deref(),
                )?,
                None => formatter.format(&ErrorOutput {
                    error: state.last_error.clone().unwrap_or_default(),
                    retryable: true,
                })?,
            };
            println!("{line}");
        }
    }
    Ok(())
}
