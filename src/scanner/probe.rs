//! Single-port TCP connect prober.
//!
//! Performs one connection attempt per port using the operating
//! system's socket API. This completes the full TCP handshake, so it
//! needs no elevated privileges. The connection is dropped as soon as
//! it is established; this is a connectivity probe, not a data
//! exchange.

use crate::error::{ProbeError, ProbeResult};
use crate::scanner::{http, ScanResult, ScannerConfig};
use crate::types::Port;
use std::time::Instant;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Ports conventionally carrying HTTP or HTTPS traffic. Open ports in
/// this set get a follow-up HTTP status probe.
pub const WEB_PORTS: [u16; 4] = [80, 443, 8080, 8443];

/// Probe one `host:port` pair with a single TCP connect attempt.
///
/// Never fails: connection errors become the `error` field of the
/// returned result. For web-convention ports a successful connect is
/// followed by an HTTP status fetch whose timing and outcome supersede
/// the bare connect's.
pub async fn probe_port(
    host: &str,
    port: Port,
    config: &ScannerConfig,
    cancel: &CancellationToken,
) -> ScanResult {
    let start = Instant::now();

    match attempt_connect(host, port, config, cancel).await {
        Ok(stream) => {
            // Established is all we need to know.
            drop(stream);
            trace!(host, %port, "port open");

            let mut result = ScanResult::open(host, port, start.elapsed());
            if WEB_PORTS.contains(&port.as_u16()) {
                http::fetch_http_status(&mut result, config).await;
            }
            result
        }
        Err(e) => ScanResult::closed(host, port, e.to_string(), start.elapsed()),
    }
}

/// Attempt a timeout-bounded connect, resolving early on cancellation.
///
/// The address is dialed as a `host:port` string so that DNS failures
/// surface here, per probe, rather than up front.
async fn attempt_connect(
    host: &str,
    port: Port,
    config: &ScannerConfig,
    cancel: &CancellationToken,
) -> ProbeResult<TcpStream> {
    if cancel.is_cancelled() {
        return Err(ProbeError::Cancelled);
    }

    let addr = format!("{}:{}", host, port);

    tokio::select! {
        _ = cancel.cancelled() => Err(ProbeError::Cancelled),
        connect = timeout(config.timeout, TcpStream::connect(&addr)) => match connect {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ProbeError::ConnectionFailed(e.to_string())),
            Err(_) => Err(ProbeError::Timeout),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new_unchecked(listener.local_addr().unwrap().port());

        let config = ScannerConfig::default().with_timeout(Duration::from_millis(500));
        let result = probe_port("127.0.0.1", port, &config, &CancellationToken::new()).await;

        assert!(result.open);
        assert!(result.error.is_none());
        assert_eq!(result.host, "127.0.0.1");
        assert_eq!(result.port, port);
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // Port 1 is almost certainly closed on loopback.
        let config = ScannerConfig::default().with_timeout(Duration::from_millis(200));
        let result = probe_port(
            "127.0.0.1",
            Port::new_unchecked(1),
            &config,
            &CancellationToken::new(),
        )
        .await;

        assert!(!result.open);
        assert!(result.error.is_some());
        assert!(result.http_status.is_none());
        assert!(result.protocol.is_none());
    }

    #[tokio::test]
    async fn test_probe_reports_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let config = ScannerConfig::default();
        let result = probe_port("127.0.0.1", Port::new_unchecked(9999), &config, &cancel).await;

        assert!(!result.open);
        assert_eq!(result.error.as_deref(), Some("scan cancelled"));
    }

    #[tokio::test]
    async fn test_probe_classifies_service() {
        let config = ScannerConfig::default().with_timeout(Duration::from_millis(200));
        let result = probe_port(
            "127.0.0.1",
            Port::new_unchecked(3306),
            &config,
            &CancellationToken::new(),
        )
        .await;

        // Classification does not depend on the port being open.
        assert_eq!(result.service, "MySQL");
    }

    #[test]
    fn test_web_convention_ports() {
        assert!(WEB_PORTS.contains(&80));
        assert!(WEB_PORTS.contains(&443));
        assert!(WEB_PORTS.contains(&8080));
        assert!(WEB_PORTS.contains(&8443));
        assert!(!WEB_PORTS.contains(&22));
    }
}
