//! Provides helpers for selecting a network interface on the current host
//!
//! These are only consulted when no target specification is given and the
//! whole subnet of the bound interface has to be scanned, or when the
//! current host's own MAC address is needed.

use ipnet::Ipv4Net;
#[cfg(test)]
use mockall::automock;
use pnet::{
    datalink::NetworkInterface as PNetNetworkInterface, ipnetwork::IpNetwork,
    util::MacAddr,
};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use crate::error::{RNetLibError, Result};

/// Public routable address used to ask the OS which local address it would
/// bind for outbound traffic. No packets are sent.
const ROUTE_PROBE_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(8, 8, 8, 8), 80);

/// Represents a network interface on current host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    /// The name of the interface
    pub name: String,
    /// The IPv4 address assigned to the interface
    pub ipv4: Ipv4Addr,
    /// The network the interface belongs to (host bits masked off)
    pub cidr: Ipv4Net,
    /// The MAC address of the interface, when it has one
    pub mac: Option<MacAddr>,
}

impl TryFrom<PNetNetworkInterface> for NetworkInterface {
    type Error = RNetLibError;

    fn try_from(value: PNetNetworkInterface) -> Result<Self> {
        let (ipv4, cidr) =
            get_interface_ipv4_and_cidr(&value, None).ok_or_else(|| {
                RNetLibError::LocalNetwork(format!(
                    "interface {} has no ipv4 address",
                    value.name
                ))
            })?;

        Ok(Self {
            name: value.name,
            ipv4,
            cidr,
            mac: value.mac,
        })
    }
}

/// Trait describing the local-interface queries a scan depends on
#[cfg_attr(test, automock)]
pub trait InterfaceQuery: Send + Sync {
    /// Returns the address the host would bind for outbound traffic
    fn default_bound_address(&self) -> Result<Ipv4Addr>;
    /// Returns the network of the interface that owns `ip`
    fn network_for(&self, ip: Ipv4Addr) -> Result<Ipv4Net>;
}

/// [`InterfaceQuery`] backed by the operating system's interface table
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceQuery for SystemInterfaces {
    fn default_bound_address(&self) -> Result<Ipv4Addr> {
        get_default_bound_address()
    }

    fn network_for(&self, ip: Ipv4Addr) -> Result<Ipv4Net> {
        Ok(get_interface_for_ip(ip)?.cidr)
    }
}

/// Finds and returns a NetworkInterface by name
pub fn get_interface(name: &str) -> Result<NetworkInterface> {
    let iface = pnet::datalink::interfaces()
        .into_iter()
        .find(|i| i.name == name)
        .ok_or_else(|| {
            RNetLibError::LocalNetwork(format!("no interface named {name}"))
        })?;
    NetworkInterface::try_from(iface)
}

/// Finds and returns the interface that owns the given IPv4 address
pub fn get_interface_for_ip(ip: Ipv4Addr) -> Result<NetworkInterface> {
    pnet::datalink::interfaces()
        .into_iter()
        .find_map(|iface| {
            let (ipv4, cidr) = get_interface_ipv4_and_cidr(&iface, Some(ip))?;
            Some(NetworkInterface {
                name: iface.name,
                ipv4,
                cidr,
                mac: iface.mac,
            })
        })
        .ok_or_else(|| {
            RNetLibError::LocalNetwork(format!("no interface is bound to {ip}"))
        })
}

/// Finds and returns the first interface that is up, not loopback, and has
/// an IPv4 address
pub fn get_default_interface() -> Result<NetworkInterface> {
    let iface = pnet::datalink::interfaces()
        .into_iter()
        .find(|e| {
            e.is_up() && !e.is_loopback() && e.ips.iter().any(|i| i.is_ipv4())
        })
        .ok_or_else(|| {
            RNetLibError::LocalNetwork(
                "could not detect default network interface".into(),
            )
        })?;
    NetworkInterface::try_from(iface)
}

/// Returns the local IPv4 address the OS selects for outbound traffic
pub fn get_default_bound_address() -> Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(ROUTE_PROBE_ADDR).map_err(|e| {
        RNetLibError::LocalNetwork(format!("no default route: {e}"))
    })?;

    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
        other => Err(RNetLibError::LocalNetwork(format!(
            "default route is bound to unsupported address {other}"
        ))),
    }
}

// Returns the first ipv4 address of the interface (or the one matching
// `wanted`) together with its masked network
fn get_interface_ipv4_and_cidr(
    interface: &PNetNetworkInterface,
    wanted: Option<Ipv4Addr>,
) -> Option<(Ipv4Addr, Ipv4Net)> {
    interface.ips.iter().find_map(|n| match n {
        IpNetwork::V4(net) if wanted.is_none_or(|w| w == net.ip()) => {
            Ipv4Net::new(net.ip(), net.prefix())
                .ok()
                .map(|cidr| (net.ip(), cidr.trunc()))
        }
        _ => None,
    })
}

#[cfg(test)]
#[path = "./network_tests.rs"]
mod tests;
