//! Custom Error and Result types for this library

use std::{any::Any, io, num::ParseIntError, sync::PoisonError};
use thiserror::Error;

use crate::{config::ScanConfigBuilderError, scanners::tcp_scanner::TCPScannerBuilderError};

/// Custom Error type for this library
#[derive(Error, Debug)]
pub enum RNetLibError {
    /// The target specification could not be turned into a list of hosts
    #[error("invalid target specification {spec:?}: {reason}")]
    InvalidTargetSpec {
        /// The raw specification provided by the caller
        spec: String,
        /// Why the specification was rejected
        reason: String,
    },

    /// A port in the port list could not be parsed
    #[error("invalid port {port:?}: {reason}")]
    InvalidPort {
        /// The offending port token
        port: String,
        /// Why the port was rejected
        reason: String,
    },

    /// The local interface or its network could not be determined
    #[error("cannot determine local network: {_0}")]
    LocalNetwork(String),

    /// The process ran out of sockets while probing
    #[error("no sockets available while probing {ip}:{port}")]
    SocketsExhausted {
        /// The target being probed when the failure occurred
        ip: String,
        /// The port being probed when the failure occurred
        port: u16,
    },

    /// Generic thread error
    #[error("thread error: {_0}")]
    ThreadError(String),

    /// Error obtaining lock on the shared work queue
    #[error("failed to get lock on work queue: {_0}")]
    QueueLock(String),

    /// Error resulting from failure to build the TCP scanner
    #[error("failed to build tcp scanner: {_0}")]
    ScannerBuild(#[from] TCPScannerBuilderError),

    /// Error resulting from failure to build a scan configuration
    #[error("failed to build scan config: {_0}")]
    ConfigBuild(#[from] ScanConfigBuilderError),

    /// Wrapping I/O errors from the local system
    #[error("io error: {_0}")]
    Io(#[from] io::Error),
}

impl From<Box<dyn Any + Send>> for RNetLibError {
    fn from(value: Box<dyn Any + Send>) -> Self {
        if let Some(s) = value.downcast_ref::<&'static str>() {
            Self::ThreadError(format!("Thread panicked with: {}", s))
        } else if let Some(s) = value.downcast_ref::<String>() {
            Self::ThreadError(format!("Thread panicked with: {}", s))
        } else {
            Self::ThreadError("Thread panicked with an unknown type".into())
        }
    }
}

impl<T> From<PoisonError<T>> for RNetLibError {
    fn from(value: PoisonError<T>) -> Self {
        Self::QueueLock(value.to_string())
    }
}

impl RNetLibError {
    /// Converter for std::net::AddrParseError
    pub fn from_net_addr_parse_error(
        spec: &str,
        error: std::net::AddrParseError,
    ) -> Self {
        Self::InvalidTargetSpec {
            spec: spec.to_string(),
            reason: error.to_string(),
        }
    }

    /// Converter for ipnet::AddrParseError
    pub fn from_ipnet_addr_parse_error(
        spec: &str,
        error: ipnet::AddrParseError,
    ) -> Self {
        Self::InvalidTargetSpec {
            spec: spec.to_string(),
            reason: error.to_string(),
        }
    }

    /// Converter for ParseIntError
    pub fn from_port_parse_int_err(port: &str, error: ParseIntError) -> Self {
        Self::InvalidPort {
            port: port.to_string(),
            reason: error.to_string(),
        }
    }

    /// Returns true for errors raised before any worker is started
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTargetSpec { .. }
                | Self::InvalidPort { .. }
                | Self::LocalNetwork(_)
                | Self::ScannerBuild(_)
                | Self::ConfigBuild(_)
        )
    }
}

/// Custom Result type for this library. All Errors exposed by this library
/// will be returned as [`RNetLibError`]
pub type Result<T> = std::result::Result<T, RNetLibError>;

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;
