//! Provides the destinations scan results are delivered to
//!
//! A scan is configured with exactly one sink. Workers call
//! [`ResultSink::emit`] concurrently, once per live target, in no
//! particular order.

#[cfg(test)]
use mockall::automock;
use std::{
    io::{self, Write},
    sync::Mutex,
};

use crate::scanners::{ScanRecord, ScanResult, format_ports};

/// Width the target column is padded to in console output
pub const TARGET_COLUMN_WIDTH: usize = 15;

/// Trait describing a consumer of scan results
#[cfg_attr(test, automock)]
pub trait ResultSink: Send + Sync {
    /// Accepts the result for one live target
    fn emit(&self, result: ScanResult);
}

/// Returns the console line for a result, e.g.
/// `192.168.1.1      Made by Cisco Systems, Inc  Listening ports: [22, 80]`
pub fn format_console_line(result: &ScanResult) -> String {
    let vendor = if result.vendor.is_empty() {
        String::new()
    } else {
        format!("Made by {}", result.vendor)
    };

    let ports = if result.open_ports.is_empty() {
        String::new()
    } else {
        format!("Listening ports: {}", format_ports(&result.open_ports))
    };

    format!(
        "{:<width$}  {}  {}",
        result.ip.to_string(),
        vendor,
        ports,
        width = TARGET_COLUMN_WIDTH
    )
    .trim_end()
    .to_string()
}

/// Writes one line per result as soon as it is emitted
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(io::stdout())
    }
}

impl ConsoleSink {
    /// Returns a sink writing to `out`
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl ResultSink for ConsoleSink {
    fn emit(&self, result: ScanResult) {
        let line = format_console_line(&result);

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            log::error!("failed to write result for {}: {}", result.ip, e);
        }
    }
}

/// Collects results in memory for the caller
#[derive(Debug, Default)]
pub struct CollectingSink {
    results: Mutex<Vec<ScanResult>>,
}

impl CollectingSink {
    /// Returns an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of results collected so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes every collected result, ordered by IP
    pub fn finalize(&self) -> Vec<ScanResult> {
        let mut results = std::mem::take(&mut *self.lock());
        results.sort();
        results
    }

    /// Returns the record projection of every collected result, ordered
    /// by IP, leaving the results in place
    pub fn records(&self) -> Vec<ScanRecord> {
        let mut results = self.lock().clone();
        results.sort();
        results.iter().map(ScanRecord::from).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ScanResult>> {
        // appends cannot leave the list half written, so a poisoned lock
        // still holds valid data
        match self.results.lock() {
            Ok(results) => results,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ResultSink for CollectingSink {
    fn emit(&self, result: ScanResult) {
        self.lock().push(result);
    }
}

#[cfg(test)]
#[path = "./sink_tests.rs"]
mod tests;
