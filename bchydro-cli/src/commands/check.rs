//! Check command - validate credentials with a single login.

use anyhow::Result;
use bchydro_portal::{AuthError, LoginSequencer};

use super::load_config;
use crate::output::{CheckOutput, JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the check command.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;
    let credentials = config.credentials()?;
    let settings = config.portal_settings()?;
    let http = settings.build_client()?;

    let result = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials)
        .await;

    let output = CheckOutput {
        ok: result.is_ok(),
        username: credentials.username().to_string(),
        subscriber_id: result.as_ref().ok().map(|s| s.subscriber_id().to_string()),
        error: result.as_ref().err().map(ToString::to_string),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            match (&output.subscriber_id, &output.error) {
                (Some(id), _) => println!("{}", formatter.format_check_ok(&output.username, id)),
                (None, Some(error)) => println!("{}", formatter.format_error("Login", error)),
                (None, None) => {}
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    if let Err(e) = result {
        let code = match e {
            AuthError::Timeout => ExitCode::Timeout,
            e if e.is_transient() => ExitCode::Error,
            _ => ExitCode::AuthFailed,
        };
        code.exit();
    }
    Ok(())
}
