//! Provides helpers for building the IP and port target lists of a scan

pub mod ips;
pub mod ports;
