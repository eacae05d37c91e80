//! Port types with validation and parsing.
//!
//! The `Port` newtype guarantees values are valid port numbers (1-65535).
//! `PortSpec` parses the user-facing specification forms: a single port,
//! a comma-separated list, or an inclusive `start-end` range.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
///
/// Using a newtype prevents accidental misuse of raw u16 values
/// and ensures port numbers are always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Create a Port without validation. Use only when the value is known valid.
    #[inline]
    pub const fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value as u32))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// A port specification parsed from user input.
///
/// Supported forms:
/// - Single port: "80"
/// - Comma-separated list: "80,443,8080"
/// - Inclusive range: "1-1000"
#[derive(Debug, Clone, Default)]
pub struct PortSpec {
    ports: Vec<Port>,
}

impl PortSpec {
    /// Get all ports in request order, deduplicated.
    pub fn to_ports(&self) -> Vec<Port> {
        let mut seen = vec![false; Port::MAX as usize + 1];
        let mut ports = Vec::with_capacity(self.ports.len());
        for &port in &self.ports {
            let idx = port.as_u16() as usize;
            if !seen[idx] {
                seen[idx] = true;
                ports.push(port);
            }
        }
        ports
    }

    /// Total number of unique ports.
    pub fn count(&self) -> usize {
        self.to_ports().len()
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut ports = Vec::new();

        for part in s.split(',') {
            let part = part.trim();
            if let Some((start_str, end_str)) = part.split_once('-') {
                let start = parse_port_number(start_str)?;
                let end = parse_port_number(end_str)?;
                if start.as_u16() > end.as_u16() {
                    return Err(PortError::InvalidRange(start.as_u16(), end.as_u16()));
                }
                ports.extend((start.as_u16()..=end.as_u16()).map(Port::new_unchecked));
            } else {
                ports.push(parse_port_number(part)?);
            }
        }

        Ok(Self { ports })
    }
}

fn parse_port_number(s: &str) -> Result<Port, PortError> {
    let s = s.trim();
    let value: u32 = s
        .parse()
        .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
    if value < Port::MIN as u32 || value > Port::MAX as u32 {
        return Err(PortError::OutOfRange(value));
    }
    Ok(Port::new_unchecked(value as u16))
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
