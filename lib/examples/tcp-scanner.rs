use color_eyre::eyre::Result;
use std::{env, sync::Arc, time::Duration};

use r_netlib::{
    config::ScanConfig,
    network::SystemInterfaces,
    scanners::Scanner,
    sink::{CollectingSink, ResultSink},
};

fn main() -> Result<()> {
    color_eyre::install()?;

    // scans the local network unless a target spec is passed
    let mut builder = ScanConfig::builder();
    builder
        .ports("22,80,443,8080")
        .workers(64_usize)
        .timeout(Duration::from_millis(500));

    if let Some(targets) = env::args().nth(1) {
        builder.targets(targets);
    }

    let config = builder.build()?;
    let sink = Arc::new(CollectingSink::new());

    let scanner =
        config.scanner(&SystemInterfaces, Arc::clone(&sink) as Arc<dyn ResultSink>)?;

    let summary = scanner.scan()?;

    println!("scanning complete: {:?}", summary);

    for record in sink.records() {
        println!("{:?}", record);
    }

    Ok(())
}
