//! # xprobe - Network Reconnaissance Engine
//!
//! xprobe determines whether a target host is reachable, enumerates
//! which TCP ports respond, classifies the likely service on each, and
//! probes web-facing ports for their HTTP status and latency.
//!
//! ## Features
//!
//! - **Liveness cascade**: ICMP echo, TCP fallback, and a common-port
//!   scan, short-circuiting on the first positive signal
//! - **Bounded concurrency**: async fan-out over a semaphore admission
//!   gate, safe for full 1-65535 range scans
//! - **HTTP probing**: status codes and round-trip latency on
//!   web-convention ports (certificate validation deliberately off)
//! - **Cancellation**: an in-flight scan can be aborted via a
//!   `CancellationToken`; every port still gets a result
//! - **Multiple Output Formats**: plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use xprobe::scanner::{scan, ScannerConfig};
//! use xprobe::types::PortSpec;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ports = "22,80,443".parse::<PortSpec>().unwrap().to_ports();
//!     let config = ScannerConfig::default();
//!     let cancel = CancellationToken::new();
//!
//!     for result in scan("192.168.1.1", &ports, &config, &cancel).await {
//!         println!("{}: {}", result.port, if result.open { "open" } else { "closed" });
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port newtype and port-specification parsing
//! - [`scanner`] - Scan engine, port prober, HTTP fetcher, liveness cascade
//! - [`services`] - Static well-known-port service table
//! - [`output`] - Result-table, JSON, and CSV rendering
//! - [`error`] - Probe error types

pub mod cli;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::ProbeError;
pub use scanner::{check_host, probe_port, scan, ScanResult, ScannerConfig};
pub use types::{Port, PortError, PortSpec};
