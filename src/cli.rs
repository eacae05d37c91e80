//! Command-line interface definition.

use crate::output::OutputFormat;
use clap::Parser;

/// xprobe - network reconnaissance tool.
///
/// Checks whether a host is alive, scans its TCP ports with bounded
/// concurrency, classifies services, and probes web-convention ports
/// for their HTTP status.
#[derive(Parser, Debug)]
#[command(name = "xprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast network reconnaissance tool", long_about = None)]
pub struct Cli {
    /// Host to scan (IP address or domain name)
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Ports to scan (e.g. "80", "80,443", or "1-1000")
    #[arg(short, long, default_value = "80,443")]
    pub ports: String,

    /// Connection timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    pub timeout: u64,

    /// Maximum number of concurrent probes
    #[arg(short, long, default_value = "100")]
    pub concurrency: usize,

    /// Only check whether the host is alive; skip the port scan
    #[arg(long)]
    pub check: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
