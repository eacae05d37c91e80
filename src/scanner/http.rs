//! HTTP status probing for web-convention ports.
//!
//! Issues a single GET against an already-confirmed-open port and
//! records the status code. Certificate validation is intentionally
//! disabled: the probe's purpose is liveness and status discovery, not
//! trust establishment, and rejecting self-signed endpoints would
//! misreport reachable HTTPS services as failures.

use crate::scanner::{ScanResult, ScannerConfig};
use reqwest::Client;
use std::time::Instant;
use tracing::trace;

/// Pick the URL scheme for a web-convention port.
pub fn scheme_for_port(port: u16) -> &'static str {
    if port == 443 || port == 8443 {
        "https"
    } else {
        "http"
    }
}

/// Fetch the HTTP status of `result.host:result.port` and fold the
/// outcome into `result`.
///
/// On success the HTTP round trip's timing, status, and protocol
/// replace the bare connect's. On failure only the error field is set;
/// the port stays open, since the prior TCP connect already succeeded.
pub async fn fetch_http_status(result: &mut ScanResult, config: &ScannerConfig) {
    let scheme = scheme_for_port(result.port.as_u16());
    let url = format!("{}://{}:{}/", scheme, result.host, result.port);

    let client = match Client::builder()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(true)
        .user_agent(config.user_agent.as_str())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            result.error = Some(e.to_string());
            return;
        }
    };

    let start = Instant::now();
    let response = client.get(&url).send().await;
    result.response_time = start.elapsed();

    match response {
        Ok(resp) => {
            trace!(url, status = resp.status().as_u16(), "HTTP probe succeeded");
            result.http_status = Some(resp.status().as_u16());
            result.protocol = Some("HTTP");
        }
        Err(e) => {
            trace!(url, error = %e, "HTTP probe failed");
            result.error = Some(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_scheme_selection() {
        assert_eq!(scheme_for_port(80), "http");
        assert_eq!(scheme_for_port(8080), "http");
        assert_eq!(scheme_for_port(443), "https");
        assert_eq!(scheme_for_port(8443), "https");
    }

    #[tokio::test]
    async fn test_fetch_status_from_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                    .await;
            }
        });

        let config = ScannerConfig::default().with_timeout(Duration::from_secs(2));
        let mut result =
            ScanResult::open("127.0.0.1", Port::new_unchecked(port), Duration::ZERO);
        fetch_http_status(&mut result, &config).await;

        assert_eq!(result.http_status, Some(200));
        assert_eq!(result.protocol, Some("HTTP"));
        assert!(result.open);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_port_open() {
        // Nothing is listening here; the request fails fast.
        let config = ScannerConfig::default().with_timeout(Duration::from_millis(200));
        let mut result =
            ScanResult::open("127.0.0.1", Port::new_unchecked(9998), Duration::ZERO);
        fetch_http_status(&mut result, &config).await;

        assert!(result.open);
        assert!(result.http_status.is_none());
        assert!(result.protocol.is_none());
        assert!(result.error.is_some());
    }
}
