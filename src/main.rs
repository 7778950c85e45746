mod client;
mod config;
mod notify;
mod run;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::error;

use crate::client::Nosh;
use crate::config::Config;
use crate::notify::{Slack, Stdout};

/// Hard wall-clock ceiling for one whole run; a wedged page fetch must not
/// stall the schedule it runs under.
const RUN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Parser)]
#[command(name = "kondate")]
#[command(about = "Posts a Slack reminder when a meal-plan change deadline is about to pass")]
struct Cli {
    /// Print reminders to stdout instead of posting them to Slack
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let cli = Cli::parse();
    match try_main(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let nosh = Nosh::new()?;
    let now = Utc::now();

    let outcome = if cli.dry_run {
        tokio::time::timeout(RUN_TIMEOUT, run::run(&config, &nosh, &Stdout, now)).await
    } else {
        let slack = Slack::new(&config.slack_webhook_url, &config.slack_channel);
        tokio::time::timeout(RUN_TIMEOUT, run::run(&config, &nosh, &slack, now)).await
    };

    outcome
        .map_err(|_| anyhow::anyhow!("run timed out after {}s", RUN_TIMEOUT.as_secs()))?
        .context("reminder run failed")
}
