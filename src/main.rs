//! xprobe binary entry point.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use xprobe::cli::Cli;
use xprobe::output::{self, OutputFormat};
use xprobe::scanner::{check_host, scan, ScannerConfig};
use xprobe::types::PortSpec;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match run(cli, cancel).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> anyhow::Result<ExitCode> {
    // Validate the port spec before any network activity.
    let ports = cli
        .ports
        .parse::<PortSpec>()
        .with_context(|| format!("invalid port specification '{}'", cli.ports))?
        .to_ports();

    if cli.output == OutputFormat::Plain {
        output::print_banner();
    }

    let config = ScannerConfig::default()
        .with_timeout(Duration::from_millis(cli.timeout))
        .with_concurrency(cli.concurrency)
        .with_verbose(cli.verbose);

    if !check_host(&cli.host, &config, &cancel).await {
        output::print_failure(&format!("Host {} appears to be down", cli.host));
        return Ok(ExitCode::from(1));
    }

    if cli.check {
        output::print_success(&format!("Host {} is alive", cli.host));
        return Ok(ExitCode::SUCCESS);
    }

    let results = scan(&cli.host, &ports, &config, &cancel).await;

    output::print_results(&cli.host, &results, cli.output)
        .context("failed to write scan results")?;

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "xprobe=debug" } else { "xprobe=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
