//! Provides Scanner implementation for TCP connect scanning

use derive_builder::Builder;
use log::*;
use std::{
    net::Ipv4Addr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{
    error::Result,
    mac::{MacResolver, NeighborTableResolver},
    probe::{DEFAULT_CONNECT_TIMEOUT, Prober},
    sink::{CollectingSink, ResultSink},
    targets::{ips::IPTargets, ports::PortTargets},
    vendor::VendorResolver,
};

use super::{
    DEFAULT_WORKERS, ScanResult, ScanSummary, Scanner,
    pool::{WorkQueue, WorkerPool},
};

/// Data structure representing a TCP connect scanner
#[derive(Clone, Builder)]
#[builder(setter(into))]
pub struct TCPScanner {
    /// IP targets to scan
    targets: Arc<IPTargets>,
    /// Ports probed on every target
    #[builder(default = "Arc::new(PortTargets::default())")]
    ports: Arc<PortTargets>,
    /// Number of concurrent workers
    #[builder(default = "DEFAULT_WORKERS")]
    workers: usize,
    /// Bound on each connect attempt
    #[builder(default = "DEFAULT_CONNECT_TIMEOUT")]
    timeout: Duration,
    /// Resolves target MAC addresses; an unresolved target is unreachable
    #[builder(default = "Arc::new(NeighborTableResolver::new()) as Arc<dyn MacResolver>")]
    mac_resolver: Arc<dyn MacResolver>,
    /// Resolves NIC vendors of live targets
    #[builder(default)]
    vendor_resolver: VendorResolver,
    /// Receives one result per live target as soon as it is known
    sink: Arc<dyn ResultSink>,
}

impl TCPScanner {
    /// Returns a builder for TCPScanner
    pub fn builder() -> TCPScannerBuilder {
        TCPScannerBuilder::default()
    }

    fn process_target(&self, prober: &Prober, target: Ipv4Addr) -> Result<bool> {
        debug!("scanning target: {}", target);

        let outcome = prober.probe(target, &self.ports)?;

        let Some(mac) = outcome.mac else {
            debug!("no mac address for {}, treating as unreachable", target);
            return Ok(false);
        };

        let vendor = self.vendor_resolver.resolve(mac);

        self.sink.emit(ScanResult {
            ip: target,
            mac,
            vendor,
            open_ports: outcome.open,
        });

        Ok(true)
    }
}

// Implements the Scanner trait for TCPScanner
impl Scanner for TCPScanner {
    fn scan(&self) -> Result<ScanSummary> {
        let started = Instant::now();

        debug!("performing TCP scan on {} targets", self.targets.len());
        debug!("ports: {:?}", self.ports.as_slice());
        debug!("workers: {}", self.workers);
        debug!("timeout: {:?}", self.timeout);

        let queue = WorkQueue::closed_from(self.targets.iter().copied())?;
        let prober = Prober::new(self.timeout, Arc::clone(&self.mac_resolver));
        let probed = AtomicUsize::new(0);
        let alive = AtomicUsize::new(0);

        WorkerPool::new(self.workers).run(&queue, |target| {
            let is_alive = self.process_target(&prober, target)?;
            probed.fetch_add(1, Ordering::SeqCst);
            if is_alive {
                alive.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        })?;

        let summary = ScanSummary {
            targets: queue.len(),
            probed: probed.into_inner(),
            alive: alive.into_inner(),
            elapsed: started.elapsed(),
        };

        info!(
            "scanned {} targets in {:?}, {} alive",
            summary.probed, summary.elapsed, summary.alive
        );

        Ok(summary)
    }
}

/// Scans `targets` with `workers` threads and returns every live host,
/// ordered by IP, once all workers have finished
pub fn scan_targets(
    targets: IPTargets,
    ports: PortTargets,
    workers: usize,
) -> Result<Vec<ScanResult>> {
    let sink = Arc::new(CollectingSink::new());

    let scanner = TCPScanner::builder()
        .targets(Arc::new(targets))
        .ports(Arc::new(ports))
        .workers(workers)
        .sink(Arc::clone(&sink) as Arc<dyn ResultSink>)
        .build()?;

    scanner.scan()?;

    Ok(sink.finalize())
}

#[cfg(test)]
#[path = "./tcp_scanner_tests.rs"]
mod tests;
