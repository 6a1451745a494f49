//! Provides the per-target TCP connect probe

use pnet::util::MacAddr;
use std::{
    io,
    net::{Ipv4Addr, Shutdown, SocketAddr, TcpStream},
    sync::Arc,
    time::Duration,
};

use crate::{
    error::{RNetLibError, Result},
    mac::MacResolver,
    targets::ports::PortTargets,
};

/// Default bound on a single connect attempt
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);

#[cfg(unix)]
const EXHAUSTION_ERRNOS: &[i32] = &[23, 24]; // ENFILE, EMFILE
#[cfg(windows)]
const EXHAUSTION_ERRNOS: &[i32] = &[10024, 10055]; // WSAEMFILE, WSAENOBUFS
#[cfg(not(any(unix, windows)))]
const EXHAUSTION_ERRNOS: &[i32] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of a single TCP connect attempt
pub enum ConnectOutcome {
    /// The handshake completed
    Open,
    /// The target actively refused the connection
    Refused,
    /// No answer arrived within the timeout
    TimedOut,
    /// Any other failure (no route, host down, network error)
    Unreachable,
}

impl ConnectOutcome {
    /// Returns true if the port accepted the connection
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    fn from_io_error(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Self::TimedOut
            }
            _ => Self::Unreachable,
        }
    }
}

fn is_socket_exhaustion(error: &io::Error) -> bool {
    error
        .raw_os_error()
        .is_some_and(|code| EXHAUSTION_ERRNOS.contains(&code))
}

/// Attempts a single TCP connection to `ip:port`
///
/// An established connection is shut down immediately and the socket is
/// closed before returning. Every connect failure is reported as an
/// outcome; only running out of sockets is an error.
pub fn connect(
    ip: Ipv4Addr,
    port: u16,
    timeout: Duration,
) -> Result<ConnectOutcome> {
    let addr = SocketAddr::from((ip, port));

    match TcpStream::connect_timeout(&addr, timeout) {
        Ok(stream) => {
            // peer may already have closed its side
            let _ = stream.shutdown(Shutdown::Both);
            Ok(ConnectOutcome::Open)
        }
        Err(e) if is_socket_exhaustion(&e) => {
            Err(RNetLibError::SocketsExhausted {
                ip: ip.to_string(),
                port,
            })
        }
        Err(e) => {
            log::trace!("connect {} failed: {}", addr, e);
            Ok(ConnectOutcome::from_io_error(&e))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Findings for a single target
pub struct ProbeOutcome {
    /// Requested ports that accepted a connection, in probe order
    pub open: Vec<u16>,
    /// MAC address of the target, if it could be resolved
    pub mac: Option<MacAddr>,
}

impl ProbeOutcome {
    /// A target is alive iff its MAC address resolved
    pub fn is_alive(&self) -> bool {
        self.mac.is_some()
    }
}

/// Probes a target's ports and resolves its MAC address
#[derive(Clone)]
pub struct Prober {
    timeout: Duration,
    mac_resolver: Arc<dyn MacResolver>,
}

impl Prober {
    /// Returns a new prober
    pub fn new(timeout: Duration, mac_resolver: Arc<dyn MacResolver>) -> Self {
        Self {
            timeout,
            mac_resolver,
        }
    }

    /// Returns the bound applied to each connect attempt
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attempts one connection per port, then resolves the MAC address once.
    /// The connect attempts prime the neighbor table for the lookup.
    pub fn probe(
        &self,
        target: Ipv4Addr,
        ports: &PortTargets,
    ) -> Result<ProbeOutcome> {
        let mut open = Vec::new();

        for port in ports.iter().copied() {
            let outcome = connect(target, port, self.timeout)?;
            log::debug!("{}:{} -> {:?}", target, port, outcome);
            if outcome.is_open() {
                open.push(port);
            }
        }

        let mac = self.mac_resolver.resolve(target);

        Ok(ProbeOutcome { open, mac })
    }
}

#[cfg(test)]
#[path = "./probe_tests.rs"]
mod tests;
