use super::*;

use crate::{
    mac::MockMacResolver,
    test_utils::{closed_port, open_port},
};

fn device_mac() -> MacAddr {
    MacAddr::new(0x3c, 0x22, 0xfb, 0x01, 0x02, 0x03)
}

#[test]
fn classifies_listening_port_as_open() {
    let (_listener, port) = open_port();
    let outcome = connect(Ipv4Addr::LOCALHOST, port, DEFAULT_CONNECT_TIMEOUT).unwrap();
    assert_eq!(outcome, ConnectOutcome::Open);
    assert!(outcome.is_open());
}

#[test]
fn classifies_refused_port_as_closed() {
    let port = closed_port();
    let outcome = connect(Ipv4Addr::LOCALHOST, port, DEFAULT_CONNECT_TIMEOUT).unwrap();
    assert_eq!(outcome, ConnectOutcome::Refused);
    assert!(!outcome.is_open());
}

#[test]
fn maps_io_errors_to_outcomes() {
    let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
    let timed_out = io::Error::from(io::ErrorKind::TimedOut);
    let other = io::Error::from(io::ErrorKind::AddrNotAvailable);

    assert_eq!(ConnectOutcome::from_io_error(&refused), ConnectOutcome::Refused);
    assert_eq!(ConnectOutcome::from_io_error(&timed_out), ConnectOutcome::TimedOut);
    assert_eq!(ConnectOutcome::from_io_error(&other), ConnectOutcome::Unreachable);
}

#[cfg(unix)]
#[test]
fn detects_socket_exhaustion() {
    assert!(is_socket_exhaustion(&io::Error::from_raw_os_error(24)));
    assert!(!is_socket_exhaustion(&io::Error::from_raw_os_error(111)));
}

#[test]
fn reports_exactly_the_ports_that_accepted() {
    let (_l1, open_a) = open_port();
    let (_l2, open_b) = open_port();
    let closed = closed_port();

    let mut resolver = MockMacResolver::new();
    resolver
        .expect_resolve()
        .times(1)
        .returning(|_| Some(device_mac()));

    let prober = Prober::new(DEFAULT_CONNECT_TIMEOUT, Arc::new(resolver));
    let ports = PortTargets::from(vec![open_a, closed, open_b]);

    let outcome = prober.probe(Ipv4Addr::LOCALHOST, &ports).unwrap();

    assert_eq!(outcome.open, vec![open_a, open_b]);
    assert_eq!(outcome.mac, Some(device_mac()));
    assert!(outcome.is_alive());
}

#[test]
fn target_without_mac_is_not_alive_even_with_open_ports() {
    let (_listener, port) = open_port();

    let mut resolver = MockMacResolver::new();
    resolver.expect_resolve().times(1).returning(|_| None);

    let prober = Prober::new(DEFAULT_CONNECT_TIMEOUT, Arc::new(resolver));
    let outcome = prober
        .probe(Ipv4Addr::LOCALHOST, &PortTargets::from(vec![port]))
        .unwrap();

    assert_eq!(outcome.open, vec![port]);
    assert!(!outcome.is_alive());
}

#[test]
fn resolves_mac_once_with_no_ports() {
    let mut resolver = MockMacResolver::new();
    resolver
        .expect_resolve()
        .withf(|ip| *ip == Ipv4Addr::LOCALHOST)
        .times(1)
        .returning(|_| Some(device_mac()));

    let prober = Prober::new(DEFAULT_CONNECT_TIMEOUT, Arc::new(resolver));
    let outcome = prober
        .probe(Ipv4Addr::LOCALHOST, &PortTargets::from(vec![]))
        .unwrap();

    assert!(outcome.open.is_empty());
    assert!(outcome.is_alive());
}
