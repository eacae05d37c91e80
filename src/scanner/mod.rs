//! Scan engine: bounded-concurrency port probing fan-out/fan-in.
//!
//! Dispatches one probe task per requested port, limits the number of
//! in-flight probes with a semaphore, waits for every probe to finish,
//! and returns results sorted by port number.

pub mod http;
pub mod liveness;
pub mod probe;

use crate::services;
use crate::types::Port;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use liveness::check_host;
pub use probe::probe_port;

/// Outcome of probing a single port. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Target host as given by the caller (IP literal or domain name).
    pub host: String,
    /// The probed port.
    pub port: Port,
    /// Whether the TCP connect succeeded within the timeout.
    pub open: bool,
    /// Application protocol, set only when an HTTP probe got a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<&'static str>,
    /// Likely service on this port, or an "Unknown" sentinel.
    pub service: &'static str,
    /// HTTP status code, present only when an HTTP probe succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Elapsed time of the decisive network operation.
    #[serde(rename = "response_time_ms", serialize_with = "duration_as_millis")]
    pub response_time: Duration,
    /// Failure description; present iff the port is closed or an
    /// attempted HTTP probe failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn duration_as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

impl ScanResult {
    /// Result for a successful TCP connect.
    pub fn open(host: impl Into<String>, port: Port, response_time: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            open: true,
            protocol: None,
            service: services::service_label(port.as_u16()),
            http_status: None,
            response_time,
            error: None,
        }
    }

    /// Result for a failed connect attempt.
    pub fn closed(
        host: impl Into<String>,
        port: Port,
        error: impl Into<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            open: false,
            protocol: None,
            service: services::service_label(port.as_u16()),
            http_status: None,
            response_time,
            error: Some(error.into()),
        }
    }
}

/// Configuration for a scan. Constructed once per invocation and
/// never mutated while a scan is running.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Timeout applied to each connect attempt and each HTTP exchange.
    pub timeout: Duration,
    /// Maximum number of probes in flight at once.
    pub concurrency: usize,
    /// User-Agent header sent with HTTP probes.
    pub user_agent: String,
    /// Show scan progress and diagnostic narration.
    pub verbose: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            concurrency: 100,
            user_agent: concat!("xprobe/", env!("CARGO_PKG_VERSION")).to_string(),
            verbose: false,
        }
    }
}

impl ScannerConfig {
    /// Set the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the concurrency bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Enable verbose output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Scan a set of ports on one host.
///
/// Returns exactly one result per requested port, sorted ascending by
/// port number. Individual probe failures are captured inside their own
/// `ScanResult` and never abort sibling probes. The returned vector is
/// complete: no partial results are ever observable.
pub async fn scan(
    host: &str,
    ports: &[Port],
    config: &ScannerConfig,
    cancel: &CancellationToken,
) -> Vec<ScanResult> {
    debug!(host, ports = ports.len(), "starting port scan");

    let progress = if config.verbose {
        let pb = ProgressBar::new(ports.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    // The semaphore is the admission gate: an arbitrary number of tasks
    // may be queued, but at most `concurrency` probes run at once.
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));

    let probe_fn = {
        let host = host.to_string();
        let config = config.clone();
        let cancel = cancel.clone();
        move |port| {
            let host = host.clone();
            let config = config.clone();
            let cancel = cancel.clone();
            async move { probe::probe_port(&host, port, &config, &cancel).await }
        }
    };

    let mut results = scan_with(ports.to_vec(), semaphore, progress.as_ref(), probe_fn).await;

    if let Some(pb) = progress {
        pb.finish_with_message("Scan complete");
    }

    results.sort_by_key(|r| r.port);
    results
}

/// Generic scan executor with bounded concurrency.
async fn scan_with<F, Fut>(
    ports: Vec<Port>,
    semaphore: Arc<Semaphore>,
    progress: Option<&ProgressBar>,
    probe_fn: F,
) -> Vec<ScanResult>
where
    F: Fn(Port) -> Fut + Clone,
    Fut: std::future::Future<Output = ScanResult>,
{
    stream::iter(ports)
        .map(|port| {
            let sem = Arc::clone(&semaphore);
            let probe_fn = probe_fn.clone();
            let progress = progress.cloned();

            async move {
                // Acquire an admission slot before probing.
                let _permit = sem.acquire().await.unwrap();

                let result = probe_fn(port).await;

                if let Some(ref pb) = progress {
                    pb.inc(1);
                    if result.open {
                        pb.set_message(format!("Found open port: {}", port));
                    }
                }

                result
            }
        })
        .buffer_unordered(1000) // High buffering; the semaphore controls actual concurrency
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn ports_of(values: &[u16]) -> Vec<Port> {
        values.iter().map(|&p| Port::new_unchecked(p)).collect()
    }

    #[tokio::test]
    async fn test_scan_returns_one_result_per_port_sorted() {
        let config = ScannerConfig::default().with_timeout(Duration::from_millis(200));
        let cancel = CancellationToken::new();
        let ports = ports_of(&[9993, 9991, 9992]);

        let results = scan("127.0.0.1", &ports, &config, &cancel).await;

        assert_eq!(results.len(), 3);
        let seen: Vec<u16> = results.iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(seen, vec![9991, 9992, 9993]);
    }

    #[tokio::test]
    async fn test_scan_finds_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = ScannerConfig::default().with_timeout(Duration::from_millis(500));
        let cancel = CancellationToken::new();
        let ports = ports_of(&[port]);

        let results = scan("127.0.0.1", &ports, &config, &cancel).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].open);
        assert!(results[0].error.is_none());
        // Not a web-convention port, so no HTTP probe was attempted.
        assert!(results[0].http_status.is_none());
        assert!(results[0].protocol.is_none());
    }

    #[tokio::test]
    async fn test_closed_ports_report_errors() {
        let config = ScannerConfig::default().with_timeout(Duration::from_millis(200));
        let cancel = CancellationToken::new();
        let ports = ports_of(&[1]);

        let results = scan("127.0.0.1", &ports, &config, &cancel).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].open);
        assert!(results[0].error.as_deref().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn test_scan_with_minimal_concurrency() {
        let config = ScannerConfig::default()
            .with_timeout(Duration::from_millis(100))
            .with_concurrency(1);
        let cancel = CancellationToken::new();
        let ports = ports_of(&[9991, 9992, 9993, 9994]);

        let results = scan("127.0.0.1", &ports, &config, &cancel).await;
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_in_flight_probes_never_exceed_bound() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        const BOUND: usize = 3;

        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(BOUND));

        let probe_fn = {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            move |port| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    ScanResult::closed("127.0.0.1", port, "connection refused", Duration::ZERO)
                }
            }
        };

        let ports: Vec<Port> = (9900..9940).map(Port::new_unchecked).collect();
        let results = scan_with(ports, semaphore, None, probe_fn).await;

        assert_eq!(results.len(), 40);
        assert!(
            peak.load(Ordering::SeqCst) <= BOUND,
            "observed {} probes in flight, bound is {}",
            peak.load(Ordering::SeqCst),
            BOUND
        );
    }

    #[tokio::test]
    async fn test_cancelled_scan_still_yields_full_result_set() {
        let config = ScannerConfig::default().with_timeout(Duration::from_secs(5));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ports = ports_of(&[9991, 9992, 9993]);

        let results = scan("127.0.0.1", &ports, &config, &cancel).await;

        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(!result.open);
            assert_eq!(result.error.as_deref(), Some("scan cancelled"));
        }
    }

    #[test]
    fn test_result_serializes_to_millis() {
        let result = ScanResult::open("127.0.0.1", Port::new_unchecked(80), Duration::from_millis(12));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["response_time_ms"], serde_json::json!(12.0));
        assert_eq!(json["service"], "HTTP");
        assert!(json.get("http_status").is_none());
    }
}
