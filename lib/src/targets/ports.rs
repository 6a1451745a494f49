//! Provides helpers for managing port target lists

use itertools::Itertools;
use std::{slice, str::FromStr};

use crate::error::{RNetLibError, Result};

/// Ports probed when the caller does not supply any
pub const DEFAULT_PORTS: &str = "22,80,443,3389,8080";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents the ordered list of ports probed on every target
///
/// Entries are comma separated and may be single ports or inclusive ranges
/// such as `8000-8010`. Order is preserved and duplicates are dropped.
///
/// # Errors
///
/// Returns [`RNetLibError::InvalidPort`] if an entry does not parse to a
/// port in `1..=65535`
///
/// # Examples
///
/// ```
/// # use r_netlib::targets::ports::PortTargets;
/// let ports = PortTargets::parse("443,80,8000-8002").unwrap();
/// assert_eq!(ports.as_slice(), &[443, 80, 8000, 8001, 8002]);
/// ```
pub struct PortTargets(Vec<u16>);

fn parse_port(token: &str) -> Result<u16> {
    let port = token
        .parse::<u16>()
        .map_err(|e| RNetLibError::from_port_parse_int_err(token, e))?;

    if port == 0 {
        return Err(RNetLibError::InvalidPort {
            port: token.to_string(),
            reason: "port must be between 1 and 65535".into(),
        });
    }

    Ok(port)
}

fn expand_ports(list: &str) -> Result<Vec<u16>> {
    let mut ports = Vec::new();

    for target in list.split(',').map(str::trim) {
        if let Some((begin, end)) = target.split_once('-') {
            let begin = parse_port(begin.trim())?;
            let end = parse_port(end.trim())?;
            ports.extend(begin..=end);
        } else {
            ports.push(parse_port(target)?);
        }
    }

    Ok(ports.into_iter().unique().collect())
}

impl PortTargets {
    /// Parses a comma separated list of ports and port ranges
    pub fn parse(list: &str) -> Result<Self> {
        expand_ports(list).map(Self)
    }

    /// Returns true if the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of ports in the list
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over the ports in probe order
    pub fn iter(&self) -> slice::Iter<'_, u16> {
        self.0.iter()
    }

    /// Returns the ports as a slice
    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }
}

impl Default for PortTargets {
    fn default() -> Self {
        Self(vec![22, 80, 443, 3389, 8080])
    }
}

impl FromStr for PortTargets {
    type Err = RNetLibError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Vec<u16>> for PortTargets {
    fn from(value: Vec<u16>) -> Self {
        Self(value.into_iter().filter(|p| *p != 0).unique().collect())
    }
}

#[cfg(test)]
#[path = "./ports_tests.rs"]
mod tests;
