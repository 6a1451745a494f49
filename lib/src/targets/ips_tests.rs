use super::*;

use crate::network::MockInterfaceQuery;

fn ips(list: &[&str]) -> Vec<net::Ipv4Addr> {
    list.iter()
        .map(|s| net::Ipv4Addr::from_str(s).unwrap())
        .collect()
}

#[test]
fn parses_single_ip() {
    let targets = IPTargets::parse("192.168.1.1").unwrap();
    assert_eq!(targets.as_slice(), ips(&["192.168.1.1"]).as_slice());
}

#[test]
fn parses_inclusive_range() {
    let targets = IPTargets::parse("192.168.1.1-192.168.1.3").unwrap();
    assert_eq!(
        targets.as_slice(),
        ips(&["192.168.1.1", "192.168.1.2", "192.168.1.3"]).as_slice()
    );
}

#[test]
fn range_length_matches_integer_distance() {
    let targets = IPTargets::parse("10.0.0.250-10.0.1.4").unwrap();
    let begin = u32::from(net::Ipv4Addr::new(10, 0, 0, 250));
    let end = u32::from(net::Ipv4Addr::new(10, 0, 1, 4));
    assert_eq!(targets.len(), (end - begin + 1) as usize);
    assert_eq!(targets.as_slice().first(), Some(&net::Ipv4Addr::new(10, 0, 0, 250)));
    assert_eq!(targets.as_slice().last(), Some(&net::Ipv4Addr::new(10, 0, 1, 4)));
}

#[test]
fn reversed_range_is_empty() {
    let targets = IPTargets::parse("192.168.1.9-192.168.1.3").unwrap();
    assert!(targets.is_empty());
}

#[test]
fn cidr_excludes_network_and_broadcast() {
    let targets = IPTargets::parse("192.168.1.0/30").unwrap();
    assert_eq!(
        targets.as_slice(),
        ips(&["192.168.1.1", "192.168.1.2"]).as_slice()
    );
}

#[test]
fn cidr_tolerates_host_bits() {
    let targets = IPTargets::parse("192.168.1.77/30").unwrap();
    assert_eq!(
        targets.as_slice(),
        ips(&["192.168.1.77", "192.168.1.78"]).as_slice()
    );
}

#[test]
fn cidr_hosts_are_strictly_ascending() {
    let targets = IPTargets::parse("172.16.0.0/23").unwrap();
    assert_eq!(targets.len(), 510);
    assert!(targets.as_slice().windows(2).all(|w| w[0] < w[1]));
    assert!(!targets.iter().any(|ip| *ip == net::Ipv4Addr::new(172, 16, 0, 0)));
    assert!(!targets.iter().any(|ip| *ip == net::Ipv4Addr::new(172, 16, 1, 255)));
}

#[test]
fn list_preserves_input_order() {
    let targets = IPTargets::parse("10.0.0.9,10.0.0.1,10.0.0.5").unwrap();
    assert_eq!(
        targets.as_slice(),
        ips(&["10.0.0.9", "10.0.0.1", "10.0.0.5"]).as_slice()
    );
}

#[test]
fn list_keeps_first_occurrence_of_duplicates() {
    let targets = IPTargets::parse("10.0.0.2, 10.0.0.1,10.0.0.2").unwrap();
    assert_eq!(targets.as_slice(), ips(&["10.0.0.2", "10.0.0.1"]).as_slice());
}

#[test]
fn parsing_is_idempotent() {
    for spec in ["10.1.1.0/28", "10.1.1.1-10.1.1.9", "10.1.1.3,10.1.1.2", "10.1.1.1"] {
        assert_eq!(IPTargets::parse(spec).unwrap(), IPTargets::parse(spec).unwrap());
    }
}

#[test]
fn from_str_matches_parse() {
    let targets: IPTargets = "192.168.4.0/29".parse().unwrap();
    assert_eq!(targets, IPTargets::parse("192.168.4.0/29").unwrap());
}

#[test]
fn returns_error_for_malformed_ip() {
    let result = IPTargets::parse("nope");
    assert!(matches!(result, Err(RNetLibError::InvalidTargetSpec { .. })));
}

#[test]
fn returns_error_for_malformed_ip_with_slash() {
    assert!(IPTargets::parse("no/pe").is_err());
    assert!(IPTargets::parse("10.0.0.0/33").is_err());
}

#[test]
fn returns_error_for_malformed_range_start() {
    assert!(IPTargets::parse("nope-192.168.0.3").is_err());
}

#[test]
fn returns_error_for_malformed_range_end() {
    assert!(IPTargets::parse("192.168.0.4-nope").is_err());
}

#[test]
fn returns_error_for_range_with_extra_dash() {
    assert!(IPTargets::parse("192.168.0.1-192.168.0.4-192.168.0.9").is_err());
}

#[test]
fn returns_error_for_invalid_list_entry() {
    assert!(IPTargets::parse("192.168.0.1,router.lan").is_err());
}

#[test]
fn returns_error_for_empty_list_entry() {
    assert!(IPTargets::parse("192.168.0.1,,192.168.0.2").is_err());
    assert!(IPTargets::parse("192.168.0.1,").is_err());
}

#[test]
fn returns_error_for_empty_spec() {
    assert!(IPTargets::parse("   ").is_err());
}

#[test]
fn enumerates_local_network_of_default_address() {
    let mut query = MockInterfaceQuery::new();
    query
        .expect_default_bound_address()
        .times(1)
        .returning(|| Ok(net::Ipv4Addr::new(192, 168, 50, 17)));
    query
        .expect_network_for()
        .withf(|ip| *ip == net::Ipv4Addr::new(192, 168, 50, 17))
        .returning(|_| Ok("192.168.50.0/29".parse().unwrap()));

    let targets = IPTargets::from_local_network(&query, None).unwrap();

    assert_eq!(targets.len(), 6);
    assert_eq!(targets.as_slice()[0], net::Ipv4Addr::new(192, 168, 50, 1));
}

#[test]
fn enumerates_local_network_of_bind_address() {
    let mut query = MockInterfaceQuery::new();
    query.expect_default_bound_address().never();
    query
        .expect_network_for()
        .withf(|ip| *ip == net::Ipv4Addr::new(10, 8, 0, 2))
        .returning(|_| Ok("10.8.0.0/30".parse().unwrap()));

    let targets =
        IPTargets::from_local_network(&query, Some(net::Ipv4Addr::new(10, 8, 0, 2)))
            .unwrap();

    assert_eq!(targets.as_slice(), ips(&["10.8.0.1", "10.8.0.2"]).as_slice());
}

#[test]
fn propagates_local_network_failure() {
    let mut query = MockInterfaceQuery::new();
    query
        .expect_default_bound_address()
        .returning(|| Err(RNetLibError::LocalNetwork("no route".into())));

    let result = IPTargets::from_local_network(&query, None);

    assert!(matches!(result, Err(RNetLibError::LocalNetwork(_))));
}
