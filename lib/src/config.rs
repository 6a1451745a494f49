//! Provides the scan configuration shared by library callers and the cli

use derive_builder::Builder;
use std::{net::Ipv4Addr, sync::Arc, time::Duration};

use crate::{
    error::Result,
    mac::{MacResolver, NeighborTableResolver},
    network::{self, InterfaceQuery},
    probe::DEFAULT_CONNECT_TIMEOUT,
    scanners::{DEFAULT_WORKERS, tcp_scanner::TCPScanner},
    sink::ResultSink,
    targets::{
        ips::IPTargets,
        ports::{DEFAULT_PORTS, PortTargets},
    },
    vendor::VendorResolver,
};

/// Everything a caller can tune about a scan
///
/// Target and port lists are kept as raw specifications and only expanded
/// by [`ScanConfig::resolve_targets`] and [`ScanConfig::resolve_ports`], so
/// a bad specification is reported before any worker starts.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ScanConfig {
    /// Local IPv4 address the scan is bound to. Defaults to the address the
    /// OS selects for outbound traffic.
    #[builder(setter(into, strip_option), default)]
    pub bind: Option<Ipv4Addr>,
    /// Target specification. When omitted the whole network of the bound
    /// interface is scanned.
    #[builder(setter(into, strip_option), default)]
    pub targets: Option<String>,
    /// Comma separated ports and port ranges probed on every target
    #[builder(default = "DEFAULT_PORTS.to_string()")]
    pub ports: String,
    /// Number of concurrent workers
    #[builder(default = "DEFAULT_WORKERS")]
    pub workers: usize,
    /// Bound on each connect attempt
    #[builder(default = "DEFAULT_CONNECT_TIMEOUT")]
    pub timeout: Duration,
    /// Whether vendor names are looked up for live targets
    #[builder(default = "true")]
    pub vendor: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            bind: None,
            targets: None,
            ports: DEFAULT_PORTS.to_string(),
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_CONNECT_TIMEOUT,
            vendor: true,
        }
    }
}

impl ScanConfig {
    /// Returns a builder for ScanConfig
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Expands the target specification, falling back to the network of
    /// the bound interface when none was given
    pub fn resolve_targets(&self, query: &dyn InterfaceQuery) -> Result<IPTargets> {
        match self.targets.as_deref() {
            Some(spec) => IPTargets::parse(spec),
            None => IPTargets::from_local_network(query, self.bind),
        }
    }

    /// Expands the port list
    pub fn resolve_ports(&self) -> Result<PortTargets> {
        PortTargets::parse(&self.ports)
    }

    /// Returns the vendor resolver this configuration asks for
    pub fn vendor_resolver(&self) -> VendorResolver {
        if self.vendor {
            VendorResolver::default()
        } else {
            VendorResolver::disabled()
        }
    }

    /// Builds a [`TCPScanner`] delivering results to `sink`
    ///
    /// Targets and ports are expanded first, so any configuration error is
    /// returned here rather than from the scan.
    pub fn scanner(
        &self,
        query: &dyn InterfaceQuery,
        sink: Arc<dyn ResultSink>,
    ) -> Result<TCPScanner> {
        let targets = self.resolve_targets(query)?;
        let ports = self.resolve_ports()?;

        log::debug!("resolved {} targets and {} ports", targets.len(), ports.len());

        let scanner = TCPScanner::builder()
            .targets(Arc::new(targets))
            .ports(Arc::new(ports))
            .workers(self.workers)
            .timeout(self.timeout)
            .mac_resolver(self.mac_resolver(query))
            .vendor_resolver(self.vendor_resolver())
            .sink(sink)
            .build()?;

        Ok(scanner)
    }

    // The kernel never lists the host's own address in its neighbor table,
    // so the bound interface's MAC is registered with the resolver
    fn mac_resolver(&self, query: &dyn InterfaceQuery) -> Arc<dyn MacResolver> {
        let resolver = NeighborTableResolver::new();

        let bound = match self.bind {
            Some(ip) => Some(ip),
            None => query.default_bound_address().ok(),
        };

        let local = bound.and_then(|ip| {
            network::get_interface_for_ip(ip)
                .ok()
                .and_then(|iface| iface.mac)
                .map(|mac| (ip, mac))
        });

        match local {
            Some((ip, mac)) => {
                log::debug!("local host {} has mac {}", ip, mac);
                Arc::new(resolver.with_local_host(ip, mac))
            }
            None => Arc::new(resolver),
        }
    }
}

#[cfg(test)]
#[path = "./config_tests.rs"]
mod tests;
