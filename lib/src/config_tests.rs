use super::*;

use ipnet::Ipv4Net;
use pnet::util::MacAddr;

use crate::{
    error::RNetLibError, network::MockInterfaceQuery, sink::CollectingSink,
};

fn unused_query() -> MockInterfaceQuery {
    let mut query = MockInterfaceQuery::new();
    query.expect_network_for().never();
    query
        .expect_default_bound_address()
        .returning(|| Err(RNetLibError::LocalNetwork("offline".into())));
    query
}

#[test]
fn builds_with_defaults() {
    let config = ScanConfig::builder().build().unwrap();

    assert_eq!(config.bind, None);
    assert_eq!(config.targets, None);
    assert_eq!(config.ports, DEFAULT_PORTS);
    assert_eq!(config.workers, DEFAULT_WORKERS);
    assert_eq!(config.timeout, DEFAULT_CONNECT_TIMEOUT);
    assert!(config.vendor);
}

#[test]
fn builder_sets_every_field() {
    let config = ScanConfig::builder()
        .bind(Ipv4Addr::new(192, 168, 1, 5))
        .targets("192.168.1.1-192.168.1.9")
        .ports("22,80")
        .workers(4_usize)
        .timeout(Duration::from_millis(300))
        .vendor(false)
        .build()
        .unwrap();

    assert_eq!(config.bind, Some(Ipv4Addr::new(192, 168, 1, 5)));
    assert_eq!(config.targets.as_deref(), Some("192.168.1.1-192.168.1.9"));
    assert_eq!(config.ports, "22,80");
    assert_eq!(config.workers, 4);
    assert_eq!(config.timeout, Duration::from_millis(300));
    assert!(!config.vendor);
}

#[test]
fn resolves_explicit_targets_without_consulting_interfaces() {
    let mut query = MockInterfaceQuery::new();
    query.expect_default_bound_address().never();
    query.expect_network_for().never();

    let config = ScanConfig::builder().targets("10.0.0.1,10.0.0.3").build().unwrap();

    let targets = config.resolve_targets(&query).unwrap();
    assert_eq!(
        targets.as_slice(),
        &[Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 3)]
    );
}

#[test]
fn resolves_local_network_when_no_targets_given() {
    let mut query = MockInterfaceQuery::new();
    query
        .expect_default_bound_address()
        .times(1)
        .returning(|| Ok(Ipv4Addr::new(192, 168, 7, 20)));
    query
        .expect_network_for()
        .withf(|ip| *ip == Ipv4Addr::new(192, 168, 7, 20))
        .times(1)
        .returning(|_| Ok("192.168.7.0/29".parse::<Ipv4Net>().unwrap()));

    let config = ScanConfig::default();

    let targets = config.resolve_targets(&query).unwrap();
    assert_eq!(targets.len(), 6);
    assert_eq!(targets.as_slice()[0], Ipv4Addr::new(192, 168, 7, 1));
}

#[test]
fn resolves_network_of_bind_address() {
    let mut query = MockInterfaceQuery::new();
    query.expect_default_bound_address().never();
    query
        .expect_network_for()
        .withf(|ip| *ip == Ipv4Addr::new(10, 4, 0, 9))
        .times(1)
        .returning(|_| Ok("10.4.0.0/30".parse::<Ipv4Net>().unwrap()));

    let config = ScanConfig::builder()
        .bind(Ipv4Addr::new(10, 4, 0, 9))
        .build()
        .unwrap();

    let targets = config.resolve_targets(&query).unwrap();
    assert_eq!(
        targets.as_slice(),
        &[Ipv4Addr::new(10, 4, 0, 1), Ipv4Addr::new(10, 4, 0, 2)]
    );
}

#[test]
fn propagates_local_network_errors() {
    let config = ScanConfig::default();

    let result = config.resolve_targets(&unused_query());
    assert!(matches!(result, Err(RNetLibError::LocalNetwork(_))));
}

#[test]
fn rejects_bad_port_list() {
    let config = ScanConfig::builder().ports("22,http").build().unwrap();

    let result = config.resolve_ports();
    assert!(matches!(result, Err(RNetLibError::InvalidPort { ref port, .. }) if port == "http"));
}

#[test]
fn scanner_reports_configuration_errors_before_scanning() {
    let sink: Arc<dyn ResultSink> = Arc::new(CollectingSink::new());
    let config = ScanConfig::builder().targets("10.0.0.300").build().unwrap();

    let err = config.scanner(&unused_query(), sink).err().unwrap();

    assert!(matches!(err, RNetLibError::InvalidTargetSpec { .. }));
    assert!(err.is_configuration_error());
}

#[test]
fn builds_scanner_for_valid_config() {
    let sink: Arc<dyn ResultSink> = Arc::new(CollectingSink::new());
    let config = ScanConfig::builder()
        .targets("10.0.0.0/30")
        .ports("80")
        .build()
        .unwrap();

    assert!(config.scanner(&unused_query(), sink).is_ok());
}

#[test]
fn vendor_lookups_can_be_disabled() {
    let mac = MacAddr::new(0x00, 0x00, 0x0c, 0x01, 0x02, 0x03);
    let config = ScanConfig::builder().vendor(false).build().unwrap();

    assert_eq!(config.vendor_resolver().resolve(mac), "");
}
