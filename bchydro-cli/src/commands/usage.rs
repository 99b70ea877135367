//! Usage command - run one cycle and print the report.

use anyhow::Result;
use bchydro_core::ReportField;
use clap::Args;
use tracing::info;

use super::{build_cycle, load_config};
use crate::output::{ErrorOutput, JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the usage command.
#[derive(Args, Default)]
pub struct UsageArgs {
    /// Print only this field's value (e.g. `latest_usage`, `cost_to_date`).
    #[arg(long)]
    pub field: Option<String>,
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli) -> Result<()> {
    let field = args.field.as_deref().map(parse_field).transpose()?;

    let config = load_config(cli).await?;
    let cycle = build_cycle(&config)?;

    info!("Fetching usage");
    let report = match cycle.refresh().await {
        Ok(report) => report,
        Err(e) => {
            if !cli.quiet {
                match cli.format {
                    OutputFormat::Text => {
                        let formatter = TextFormatter::new(!cli.no_color);
                        eprintln!("{}", formatter.format_error("BC Hydro", &e.to_string()));
                    }
                    OutputFormat::Json => {
                        let output = ErrorOutput {
                            error: e.to_string(),
                            retryable: e.is_retryable(),
                        };
                        println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
                    }
                }
            }
            ExitCode::for_refresh_error(&e).exit();
        }
    };

    let state = cycle.subscribe().borrow().clone();
    let subscriber_id = state.subscriber_id.as_deref();

    if let Some(field) = field {
        match field.select(&report) {
            Some(value) => println!("{value}"),
            None => println!(),
        }
        return Ok(());
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_report(&report, subscriber_id, false));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_report(&report, subscriber_id, false, None)?);
        }
    }

    Ok(())
}

/// Parses a field key.
fn parse_field(key: &str) -> Result<ReportField> {
    let key = key.trim().to_lowercase().replace('-', "_");
    ReportField::ALL
        .into_iter()
        .find(|f| f.key() == key)
        .ok_or_else(|| {
            let valid: Vec<_> = ReportField::ALL.iter().map(|f| f.key()).collect();
            anyhow::anyhow!("Unknown field: {key}. Valid options: {}", valid.join(", "))
        })
}

// ============================================================================
// Tests
// ============================================================================
