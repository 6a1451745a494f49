//! Library package for concurrent TCP connect host discovery on IPv4
//! networks
//!
//! A scan enumerates a target specification (single IP, comma separated
//! list, range, or CIDR block), hands every address to a fixed pool of
//! worker threads, and reports each host whose MAC address can be resolved
//! along with its vendor and the requested ports that accepted a TCP
//! connection.
//!
//! # Examples
//!
//! ## TCP Scanning
//!
//! <https://github.com/robgonnella/r-netscan/blob/main/lib/examples/tcp-scanner.rs>
//!
//! ```bash
//! cargo run --example tcp-scanner -p r-netlib
//! ```

#![deny(missing_docs)]
pub mod config;
pub mod error;
pub mod mac;
pub mod network;
pub mod probe;
pub mod scanners;
pub mod sink;
pub mod targets;
pub mod vendor;

#[cfg(test)]
pub(crate) mod test_utils;
