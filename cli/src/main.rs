//! CLI for concurrent TCP connect host and port discovery
//!
//! Every target whose MAC address can be resolved is reported with its
//! vendor and the ports that accepted a connection. No elevated privileges
//! are required.
//!
//! # Examples
//!
//! ```bash
//! # help menu
//! r-netscan --help
//!
//! # scan the network of the default interface
//! r-netscan
//!
//! # scan a range for web servers and print json
//! r-netscan -t 192.168.1.10-192.168.1.50 -p 80,443,8000-8010 --json
//! ```
use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use log::*;
use r_netlib::{
    config::ScanConfig,
    error::Result as LibResult,
    network::SystemInterfaces,
    probe::DEFAULT_CONNECT_TIMEOUT,
    scanners::{DEFAULT_WORKERS, ScanResult, ScanSummary, Scanner},
    sink::{CollectingSink, ConsoleSink, ResultSink},
    targets::ports::DEFAULT_PORTS,
};
use std::{net::Ipv4Addr, sync::Arc, time::Duration};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// CLI for concurrent TCP connect host and port discovery
struct Args {
    /// Local IPv4 address to bind the scan to. Defaults to the address used
    /// for outbound traffic.
    #[arg(short, long)]
    bind: Option<Ipv4Addr>,

    /// IP, comma separated IP list, IP range (A-B), or CIDR block to scan.
    /// Defaults to the network of the bound interface.
    #[arg(short, long)]
    targets: Option<String>,

    /// Comma separated list of ports and port ranges to probe
    #[arg(short, long, default_value = DEFAULT_PORTS)]
    ports: String,

    /// Number of concurrent workers
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS)]
    threads: usize,

    /// Timeout in milliseconds for each connection attempt
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT.as_millis() as u64)]
    timeout_ms: u64,

    /// Output final results in json once the scan completes instead of
    /// printing each host as it is found
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Skip vendor lookups
    #[arg(long, default_value_t = false)]
    no_vendor: bool,

    /// Only print results nothing else
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// Prints debug logs including those from r-netlib
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[doc(hidden)]
fn initialize_logger(args: &Args) -> Result<()> {
    let filter = if args.quiet {
        simplelog::LevelFilter::Error
    } else if args.debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    simplelog::TermLogger::init(
        filter,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[doc(hidden)]
fn scan_config(args: &Args) -> Result<ScanConfig> {
    let mut builder = ScanConfig::builder();

    builder
        .ports(args.ports.as_str())
        .workers(args.threads)
        .timeout(Duration::from_millis(args.timeout_ms))
        .vendor(!args.no_vendor);

    if let Some(bind) = args.bind {
        builder.bind(bind);
    }

    if let Some(targets) = &args.targets {
        builder.targets(targets.as_str());
    }

    builder
        .build()
        .map_err(|e| eyre!("invalid configuration: {}", e))
}

#[doc(hidden)]
fn print_args(args: &Args, config: &ScanConfig) {
    info!("configuration:");
    info!(
        "targets:    {}",
        config.targets.as_deref().unwrap_or("local network")
    );
    info!("ports:      {}", config.ports);
    info!(
        "bind:       {}",
        config
            .bind
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "default".to_string())
    );
    info!("threads:    {}", config.workers);
    info!("timeout:    {:?}", config.timeout);
    info!("vendor:     {}", config.vendor);
    info!("json:       {}", args.json);
    info!("quiet:      {}", args.quiet);
}

#[doc(hidden)]
fn process_scan(scanner: &dyn Scanner) -> LibResult<ScanSummary> {
    info!("starting tcp scan...");

    let summary = scanner.scan()?;

    info!(
        "scan complete: {} of {} targets probed, {} alive, took {:?}",
        summary.probed, summary.targets, summary.alive, summary.elapsed
    );

    Ok(summary)
}

#[doc(hidden)]
fn print_json(results: &[ScanResult]) -> Result<()> {
    let j: String = serde_json::to_string(results)?;
    println!("{}", j);
    Ok(())
}

#[doc(hidden)]
fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    initialize_logger(&args)?;

    let config = scan_config(&args)?;

    print_args(&args, &config);

    let collector = Arc::new(CollectingSink::new());

    let sink: Arc<dyn ResultSink> = if args.json {
        Arc::clone(&collector) as Arc<dyn ResultSink>
    } else {
        Arc::new(ConsoleSink::default())
    };

    let scanner = config.scanner(&SystemInterfaces, sink)?;

    process_scan(&scanner)?;

    if args.json {
        print_json(&collector.finalize())?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "./main_tests.rs"]
mod tests;
