//! Provides helpers for managing IP target lists

use ipnet::Ipv4Net;
use itertools::Itertools;
use std::{net, slice, str::FromStr};

use crate::{
    error::{RNetLibError, Result},
    network::InterfaceQuery,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Represents the ordered list of IP targets for a scan
///
/// A target specification takes exactly one of four shapes, checked in
/// this order:
///
/// - CIDR block (`192.168.1.0/24`): every usable host address, network and
///   broadcast addresses excluded. Host bits in the address are ignored.
/// - Range (`192.168.1.10-192.168.1.20`): every address from start to end
///   inclusive. An end lower than the start yields an empty list.
/// - List (`10.0.0.1,10.0.0.7`): each address in the given order. A
///   repeated address is only kept at its first position.
/// - A single address.
///
/// # Errors
///
/// Returns [`RNetLibError::InvalidTargetSpec`] if any address component is
/// not a valid IPv4 literal, if a list contains an empty entry, or if the
/// specification is empty.
///
/// # Examples
///
/// ```
/// # use r_netlib::targets::ips::IPTargets;
/// let ips = IPTargets::parse("192.168.0.0/30").unwrap();
/// let hosts: Vec<String> = ips.iter().map(|ip| ip.to_string()).collect();
/// assert_eq!(hosts, vec!["192.168.0.1", "192.168.0.2"]);
/// ```
pub struct IPTargets(Vec<net::Ipv4Addr>);

fn invalid(spec: &str, reason: &str) -> RNetLibError {
    RNetLibError::InvalidTargetSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_ip(spec: &str, literal: &str) -> Result<net::Ipv4Addr> {
    net::Ipv4Addr::from_str(literal.trim())
        .map_err(|e| RNetLibError::from_net_addr_parse_error(spec, e))
}

fn expand_spec(spec: &str) -> Result<Vec<net::Ipv4Addr>> {
    if spec.is_empty() {
        return Err(invalid(spec, "empty target specification"));
    }

    if spec.contains('/') {
        // target is cidr block
        let ip_net = Ipv4Net::from_str(spec)
            .map_err(|e| RNetLibError::from_ipnet_addr_parse_error(spec, e))?;

        Ok(ip_net.hosts().collect())
    } else if spec.contains('-') {
        // target is range
        let (begin, end) = spec
            .split_once('-')
            .filter(|(_, end)| !end.contains('-'))
            .ok_or_else(|| invalid(spec, "range must have exactly one '-'"))?;

        let begin = u32::from(parse_ip(spec, begin)?);
        let end = u32::from(parse_ip(spec, end)?);

        Ok((begin..=end).map(net::Ipv4Addr::from).collect())
    } else if spec.contains(',') {
        // target is list
        let ips = spec
            .split(',')
            .map(|token| {
                if token.trim().is_empty() {
                    Err(invalid(spec, "empty entry in target list"))
                } else {
                    parse_ip(spec, token)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ips.into_iter().unique().collect())
    } else {
        // target is ip
        Ok(vec![parse_ip(spec, spec)?])
    }
}

impl IPTargets {
    /// Parses a target specification into an ordered list of hosts
    pub fn parse(spec: &str) -> Result<Self> {
        expand_spec(spec.trim()).map(Self)
    }

    /// Returns every usable host of the given network
    pub fn from_network(network: Ipv4Net) -> Self {
        Self(network.trunc().hosts().collect())
    }

    /// Returns every usable host of the network the current host is bound
    /// to. When `bind` is omitted the address the OS selects for outbound
    /// traffic is used.
    pub fn from_local_network(
        query: &dyn InterfaceQuery,
        bind: Option<net::Ipv4Addr>,
    ) -> Result<Self> {
        let ip = match bind {
            Some(ip) => ip,
            None => query.default_bound_address()?,
        };

        let network = query.network_for(ip)?;

        log::info!("target network is {} (bound to {})", network, ip);

        Ok(Self::from_network(network))
    }

    /// Returns the number of hosts in the list
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the hosts in scan order
    pub fn iter(&self) -> slice::Iter<'_, net::Ipv4Addr> {
        self.0.iter()
    }

    /// Returns the hosts as a slice
    pub fn as_slice(&self) -> &[net::Ipv4Addr] {
        &self.0
    }
}

impl FromStr for IPTargets {
    type Err = RNetLibError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Vec<net::Ipv4Addr>> for IPTargets {
    fn from(value: Vec<net::Ipv4Addr>) -> Self {
        Self(value.into_iter().unique().collect())
    }
}

impl<'a> IntoIterator for &'a IPTargets {
    type Item = &'a net::Ipv4Addr;
    type IntoIter = slice::Iter<'a, net::Ipv4Addr>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[path = "./ips_tests.rs"]
mod tests;
