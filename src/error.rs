//! Error types for xprobe.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-probe network
//! failures are captured as data inside `ScanResult`; these types cover
//! everything that fails before or instead of a probe.

use thiserror::Error;

/// Failure modes of a single connection probe.
///
/// These never cross the engine boundary as `Err` values. The prober
/// converts them into the `error` field of its `ScanResult`.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection timed out")]
    Timeout,

    #[error("{0}")]
    ConnectionFailed(String),

    #[error("scan cancelled")]
    Cancelled,
}

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;
