//! Output formatting utilities.
//!
//! Renders scan results as a human-readable table, JSON, or CSV, and
//! provides the startup banner and styled status messages.

use crate::scanner::ScanResult;
use console::{style, Style};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Summary wrapper serialized by the JSON format.
#[derive(Debug, Serialize)]
struct ScanReport<'a> {
    host: &'a str,
    ports_scanned: usize,
    open_ports: usize,
    closed_ports: usize,
    results: &'a [ScanResult],
}

/// Format and print scan results.
pub fn print_results(host: &str, results: &[ScanResult], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => print_plain(host, results),
        OutputFormat::Json => print_json(host, results),
        OutputFormat::Csv => print_csv(results),
    }
}

/// Print results as a table with a trailing summary line.
fn print_plain(host: &str, results: &[ScanResult]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "Scan results for {}:", style(host).bold())?;
    writeln!(
        out,
        "{:<8} {:<10} {:<16} {:<12} {}",
        style("PORT").bold(),
        style("STATUS").bold(),
        style("SERVICE").bold(),
        style("HTTP STATUS").bold(),
        style("RESPONSE TIME").bold()
    )?;
    writeln!(
        out,
        "{}",
        style("───────────────────────────────────────────────────────────").dim()
    )?;

    let mut open_count = 0;
    for result in results {
        let status_style = if result.open {
            open_count += 1;
            Style::new().green().bold()
        } else {
            Style::new().red()
        };
        let status = if result.open { "OPEN" } else { "CLOSED" };

        let http_status = result
            .http_status
            .map(|s| s.to_string())
            .unwrap_or_default();

        writeln!(
            out,
            "{:<8} {:<10} {:<16} {:<12} {}",
            result.port,
            status_style.apply_to(status),
            result.service,
            http_status,
            format_response_time(result.response_time)
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Summary: {} ports scanned, {} open, {} closed",
        results.len(),
        style(open_count).green().bold(),
        style(results.len() - open_count).red()
    )?;

    Ok(())
}

/// Print results as a JSON document with summary counts.
fn print_json(host: &str, results: &[ScanResult]) -> io::Result<()> {
    let open_ports = results.iter().filter(|r| r.open).count();
    let report = ScanReport {
        host,
        ports_scanned: results.len(),
        open_ports,
        closed_ports: results.len() - open_ports,
        results,
    };

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!("{}", json);
    Ok(())
}

/// Print results as CSV, one row per port.
fn print_csv(results: &[ScanResult]) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());

    writer.write_record([
        "host",
        "port",
        "status",
        "service",
        "http_status",
        "response_time_ms",
        "error",
    ])?;

    for result in results {
        writer.write_record([
            result.host.as_str(),
            &result.port.to_string(),
            if result.open { "open" } else { "closed" },
            result.service,
            &result
                .http_status
                .map(|s| s.to_string())
                .unwrap_or_default(),
            &format!("{:.2}", result.response_time.as_secs_f64() * 1000.0),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()
}

/// Format a response time in milliseconds with two decimal places.
fn format_response_time(d: Duration) -> String {
    format!("{:.2}ms", d.as_secs_f64() * 1000.0)
}

/// Print the startup banner.
pub fn print_banner() {
    println!(
        "{}",
        style(
            r#"
  __  __           _
  \ \/ /_ __ _  _ | |__  ___ _ _ _ __
   \  /| '_ \ || || '_ \/ -_) '_| '_ \
   /_/ | .__/\_,_|_.__/\___|_| | .__/
       |_|                     |_|
"#
        )
        .cyan()
    );
    println!(
        "    Network Reconnaissance Tool v{}\n",
        env!("CARGO_PKG_VERSION")
    );
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("[+]").green().bold(), msg);
}

/// Print a failure/status message.
pub fn print_failure(msg: &str) {
    println!("{} {}", style("[-]").red().bold(), msg);
}
