//! Provides data structures and implementations for performing network
//! scanning
//!
//! This includes:
//! - The per-host scan result and its record projection
//! - The fixed-size worker pool that drains a shared target queue
//! - TCP connect scanning

use itertools::Itertools;
#[cfg(test)]
use mockall::automock;

use pnet::util::MacAddr;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::error::Result;

/// The default number of concurrent workers for a scan
pub const DEFAULT_WORKERS: usize = 30;

fn serialize_to_string<S, T>(val: &T, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    s.serialize_str(&val.to_string())
}

fn deserialize_from_str<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let s = String::deserialize(d)?;
    s.parse::<T>().map_err(serde::de::Error::custom)
}

/// Renders ports the way they appear in console and record output, i.e.
/// `[22, 80]`
pub fn format_ports(ports: &[u16]) -> String {
    format!("[{}]", ports.iter().join(", "))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Data structure representing a live host found by a scan
pub struct ScanResult {
    /// IPv4 of the host
    pub ip: Ipv4Addr,
    /// MAC address of the host
    #[serde(
        serialize_with = "serialize_to_string",
        deserialize_with = "deserialize_from_str"
    )]
    pub mac: MacAddr,
    /// Vendor of the host's NIC, empty if unknown
    pub vendor: String,
    /// Requested ports that accepted a connection, in probe order
    pub open_ports: Vec<u16>,
}

impl ScanResult {
    /// Returns the open ports rendered as text
    pub fn open_ports_text(&self) -> String {
        format_ports(&self.open_ports)
    }

    /// Returns the four field record projection of this result
    pub fn to_record(&self) -> ScanRecord {
        ScanRecord::from(self)
    }
}

impl Ord for ScanResult {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ip.cmp(&other.ip)
    }
}

impl PartialOrd for ScanResult {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Flat `(target, mac, vendor, open ports)` record of a [`ScanResult`]
pub struct ScanRecord(pub String, pub String, pub String, pub String);

impl From<&ScanResult> for ScanRecord {
    fn from(value: &ScanResult) -> Self {
        Self(
            value.ip.to_string(),
            value.mac.to_string(),
            value.vendor.clone(),
            value.open_ports_text(),
        )
    }
}

impl From<ScanRecord> for (String, String, String, String) {
    fn from(value: ScanRecord) -> Self {
        (value.0, value.1, value.2, value.3)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Totals reported once every worker has finished
pub struct ScanSummary {
    /// Number of targets placed on the work queue
    pub targets: usize,
    /// Number of targets whose probe completed
    pub probed: usize,
    /// Number of targets that produced a result
    pub alive: usize,
    /// Wall clock duration of the scan
    pub elapsed: Duration,
}

#[cfg_attr(test, automock)]
/// Trait used by all scanners
pub trait Scanner: Sync + Send {
    /// Performs network scanning, blocking until every target is processed
    fn scan(&self) -> Result<ScanSummary>;
}

pub mod pool;
pub mod tcp_scanner;

#[cfg(test)]
#[path = "./scanners_tests.rs"]
mod tests;
