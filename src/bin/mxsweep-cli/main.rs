mod args;
mod logging;
mod progress;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

#[cfg(not(feature = "with-serde"))]
use anyhow::bail;
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use mxsweep::{
    FileSink, RunSummary, SinkError, SourceError, check_addresses, read_addresses,
    read_addresses_from_path, system_resolver,
};
use tokio::sync::watch;

use crate::args::Cli;
use crate::progress::BarProgress;

// codes de sortie : 0 OK, 1 fatal, 3 entrée illisible, 4 sortie impossible à ouvrir, 130 interrompu
const EXIT_FATAL: u8 = 1;
const EXIT_SOURCE: u8 = 3;
const EXIT_SINK: u8 = 4;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let bar = progress::status_bar(cli.quiet);
    logging::init(bar.clone());

    match run(cli, bar).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

async fn run(cli: Cli, bar: ProgressBar) -> Result<ExitCode> {
    #[cfg(not(feature = "with-serde"))]
    if cli.summary_json {
        bail!("--summary-json nécessite la feature 'with-serde'");
    }

    let options = cli.check_options();

    let addresses = if cli.stdin {
        read_addresses(io::stdin().lock()).context("read stdin")?
    } else {
        let path = cli.input_path()?;
        read_addresses_from_path(&path)?
    };
    if addresses.is_empty() {
        tracing::warn!("no addresses to check");
    }

    // la sortie doit être ouvrable avant le premier lancement
    let sink = FileSink::open(cli.output_path()?)?;
    tracing::debug!(path = %sink.path().display(), "appending alive addresses");

    let resolver = Arc::new(system_resolver(options.lookup_timeout));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing lookups in flight");
            let _ = shutdown_tx.send(true);
        }
    });

    let sweep = check_addresses(
        addresses,
        resolver,
        sink,
        BarProgress::new(bar),
        &options,
        shutdown_rx,
    )
    .await;
    drop(sweep.sink);

    report(&sweep.summary, cli.summary_json)?;

    if sweep.summary.cancelled {
        Ok(ExitCode::from(EXIT_INTERRUPTED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg_attr(not(feature = "with-serde"), allow(unused_variables))]
fn report(summary: &RunSummary, as_json: bool) -> Result<()> {
    #[cfg(feature = "with-serde")]
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!("{summary}");
    Ok(())
}

fn exit_status(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<SourceError>().is_some() {
        EXIT_SOURCE
    } else if err.downcast_ref::<SinkError>().is_some() {
        EXIT_SINK
    } else {
        EXIT_FATAL
    }
}
