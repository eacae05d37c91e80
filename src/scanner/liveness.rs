//! Host liveness detection.
//!
//! Determines whether a host is up using a cascade of progressively
//! more expensive checks, short-circuiting on the first success:
//!
//! 1. ICMP echo request against the resolved address
//! 2. TCP connect to ports 80 and 443 (ICMP is often filtered, and
//!    unprivileged processes may not be allowed to send it)
//! 3. A scan of ten well-known ports through the regular scan engine
//!
//! Host-down is a reportable outcome, not an error. Every stage
//! observes the cancellation token, so an interrupted check resolves
//! without waiting out its timeouts.

use crate::scanner::{scan, ScannerConfig};
use crate::types::Port;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Well-known ports checked by the cascade's last stage.
pub const LIVENESS_PORTS: [u16; 10] = [80, 443, 22, 21, 25, 53, 110, 143, 993, 995];

/// TCP ports tried by the cascade's second stage.
const TCP_FALLBACK_PORTS: [u16; 2] = [80, 443];

/// Check whether a host responds to any network stimulus.
pub async fn check_host(host: &str, config: &ScannerConfig, cancel: &CancellationToken) -> bool {
    debug!(host, "checking host liveness");

    if icmp_ping(host, config.timeout, cancel).await {
        debug!(host, "host is alive (ICMP echo response)");
        return true;
    }

    if let Some(port) = tcp_fallback(host, &TCP_FALLBACK_PORTS, config.timeout, cancel).await {
        debug!(host, port, "host is alive (TCP connect)");
        return true;
    }

    let ports: Vec<Port> = LIVENESS_PORTS.iter().map(|&p| Port::new_unchecked(p)).collect();
    scan_stage(host, &ports, config, cancel).await
}

/// Send a single ICMP echo request, bounded by `deadline`.
async fn icmp_ping(host: &str, deadline: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }

    let Some(ip) = resolve_host(host).await else {
        return false;
    };

    let payload = [0u8; 56];
    tokio::select! {
        _ = cancel.cancelled() => false,
        echo = timeout(deadline, surge_ping::ping(ip, &payload)) => match echo {
            Ok(Ok((_packet, rtt))) => {
                debug!(host, %ip, ?rtt, "ICMP echo reply received");
                true
            }
            Ok(Err(e)) => {
                if is_root() {
                    debug!(host, error = %e, "ICMP echo failed");
                } else {
                    debug!(
                        host,
                        error = %e,
                        "ICMP echo failed (may require elevated privileges), falling back to TCP"
                    );
                }
                false
            }
            Err(_) => {
                debug!(host, "ICMP echo timed out");
                false
            }
        },
    }
}

/// Try each fallback port in turn, returning the first that accepts.
async fn tcp_fallback(
    host: &str,
    ports: &[u16],
    deadline: Duration,
    cancel: &CancellationToken,
) -> Option<u16> {
    for &port in ports {
        if tcp_ping(host, port, deadline, cancel).await {
            return Some(port);
        }
    }
    None
}

/// Run the common-port scan and report whether any port is open.
async fn scan_stage(
    host: &str,
    ports: &[Port],
    config: &ScannerConfig,
    cancel: &CancellationToken,
) -> bool {
    let results = scan(host, ports, config, cancel).await;
    match results.iter().find(|r| r.open) {
        Some(open) => {
            debug!(host, port = %open.port, "host is alive (port open)");
            true
        }
        None => {
            debug!(host, "host appears to be down");
            false
        }
    }
}

/// Attempt a TCP connect purely as a reachability signal.
async fn tcp_ping(host: &str, port: u16, deadline: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }

    let addr = format!("{}:{}", host, port);
    tokio::select! {
        _ = cancel.cancelled() => false,
        connect = timeout(deadline, TcpStream::connect(&addr)) => {
            matches!(connect, Ok(Ok(_)))
        },
    }
}

/// Resolve a host string to an IP address for the ICMP stage.
///
/// IP literals skip DNS entirely. Only the first resolved address is
/// used; TCP stages keep dialing the original host string.
async fn resolve_host(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    match resolver.lookup_ip(host).await {
        Ok(response) => response.iter().next(),
        Err(e) => {
            debug!(host, error = %e, "DNS resolution failed");
            None
        }
    }
}

/// Check if running with root privileges (affects raw ICMP access).
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
