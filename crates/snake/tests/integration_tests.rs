//! Integration tests for ofdpa-snake
//!
//! These tests wire complete snakes into the in-memory switch and check the
//! resulting flow and group tables.

use ofdpa::{
    FlowEntry, FlowTableId, GroupId, OfdpaStatus, SoftOp, SoftSwitch, VlanMatch,
};
use ofdpa_snake::{
    ForwardingStage, PortPair, SnakeError, SnakeRunner, TopologyPlanner, VlanTag,
};
use pretty_assertions::assert_eq;

fn wire(start: u32, end: u32, vlan: u32) -> (SoftSwitch, ofdpa_snake::WireReport) {
    let mut sw = SoftSwitch::new();
    let report = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
        .run(start, end, vlan)
        .unwrap();
    (sw, report)
}

/// Returns the output port of the group the ACL on `in_port` redirects to.
fn redirect_target(sw: &SoftSwitch, in_port: u32) -> u32 {
    let group_id = sw
        .flows(FlowTableId::AclPolicy)
        .into_iter()
        .find_map(|e| match e {
            FlowEntry::AclPolicy(acl) if acl.in_port == in_port => Some(acl.group_id),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no ACL entry on port {}", in_port));
    sw.bucket(group_id).unwrap().output_port
}

#[test]
fn test_full_48_port_snake() {
    let (sw, report) = wire(1, 48, 10);

    assert_eq!(report.vlan, VlanTag::Tagged(10));
    assert_eq!(report.pairs.len(), 24);
    assert_eq!(report.pairs[0], PortPair { a: 1, b: 2 });
    assert_eq!(report.pairs[23], PortPair { a: 47, b: 48 });

    assert_eq!(sw.flows(FlowTableId::Vlan).len(), 48);
    assert_eq!(sw.flows(FlowTableId::AclPolicy).len(), 48);
    assert_eq!(sw.group_count(), 48);
    assert_eq!(report.installed.total(), 48 * 4);
}

#[test]
fn test_every_pair_forwards_both_ways() {
    let (sw, report) = wire(5, 16, 200);

    for pair in &report.pairs {
        assert_eq!(redirect_target(&sw, pair.a), pair.b);
        assert_eq!(redirect_target(&sw, pair.b), pair.a);
    }
    for port in 5..=16 {
        let group = GroupId::l2_interface(200, redirect_target(&sw, port));
        assert!(sw.has_group(group));
        assert!(!sw.bucket(group).unwrap().pop_vlan_tag);
    }
}

#[test]
fn test_untagged_snake() {
    let (sw, report) = wire(1, 4, 0);
    assert_eq!(report.vlan, VlanTag::Untagged);

    // Tagged VLAN 1 plus tag-absent on each port.
    let vlan_flows = sw.flows(FlowTableId::Vlan);
    assert_eq!(vlan_flows.len(), 8);
    let absent = vlan_flows
        .iter()
        .filter(|e| matches!(e, FlowEntry::Vlan(v) if v.vlan_match == VlanMatch::Absent))
        .count();
    assert_eq!(absent, 4);

    for e in &vlan_flows {
        if let FlowEntry::Vlan(v) = e {
            assert_eq!(v.new_vlan_id, Some(1));
        }
    }
    for port in 1..=4 {
        let group = GroupId::l2_interface(1, redirect_target(&sw, port));
        assert!(sw.bucket(group).unwrap().pop_vlan_tag);
    }
}

#[test]
fn test_internal_vlan_never_zero() {
    let (sw, _) = wire(1, 8, 0);
    for e in sw.flows(FlowTableId::AclPolicy) {
        if let FlowEntry::AclPolicy(acl) = e {
            assert_ne!(acl.group_id.vlan_id(), 0);
        }
    }
}

#[test]
fn test_bucket_precedes_acl() {
    let (sw, _) = wire(1, 2, 10);
    assert_eq!(
        sw.journal(),
        &[
            SoftOp::FlowAdd,
            SoftOp::FlowAdd,
            SoftOp::GroupAdd,
            SoftOp::GroupBucketAdd,
            SoftOp::FlowAdd,
            SoftOp::GroupAdd,
            SoftOp::GroupBucketAdd,
            SoftOp::FlowAdd,
        ]
    );
}

#[test]
fn test_validation_errors_install_nothing() {
    let cases = [(4, 4, 10), (9, 3, 10), (1, 3, 10), (1, 4, 4096)];
    for (start, end, vlan) in cases {
        let mut sw = SoftSwitch::new();
        let err = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
            .run(start, end, vlan)
            .unwrap_err();
        assert!(err.is_validation(), "{} {} {}: {}", start, end, vlan, err);
        assert_eq!(sw.calls(), 0);
    }
}

#[test]
fn test_max_port_bound() {
    let mut sw = SoftSwitch::new();
    let err = SnakeRunner::new(TopologyPlanner::new().with_max_port(32), &mut sw)
        .run(1, 48, 10)
        .unwrap_err();
    assert!(matches!(err, SnakeError::PortOutOfRange { port: 48, .. }));
    assert_eq!(sw.calls(), 0);
}

#[test]
fn test_wide_ports_rejected_before_install() {
    let mut sw = SoftSwitch::new();
    SnakeRunner::new(TopologyPlanner::new(), &mut sw)
        .run(1, 2, 10)
        .unwrap();
    let calls = sw.calls();

    let err = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
        .run(65537, 65538, 10)
        .unwrap_err();
    assert!(matches!(err, SnakeError::PortOutOfRange { port: 65537, .. }));
    assert_eq!(sw.calls(), calls);
    assert_eq!(redirect_target(&sw, 1), 2);
}

#[test]
fn test_bucket_failure_stops_run() {
    // vlan(1), vlan(2), group(1->2), bucket(1->2)
    let mut sw = SoftSwitch::new().fail_call(4, OfdpaStatus::Error);
    let err = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
        .run(1, 8, 10)
        .unwrap_err();

    match err {
        SnakeError::ForwardingInstall {
            in_port,
            out_port,
            stage,
            ..
        } => {
            assert_eq!((in_port, out_port), (1, 2));
            assert_eq!(stage, ForwardingStage::Bucket);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(sw.calls(), 4);
    assert!(sw.flows(FlowTableId::AclPolicy).is_empty());
}

#[test]
fn test_rpc_failure_mid_run_is_session_error() {
    let mut sw = SoftSwitch::new().fail_call(12, OfdpaStatus::Rpc);
    let err = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
        .run(1, 4, 10)
        .unwrap_err();
    assert!(matches!(err, SnakeError::Session { .. }));
    // First pair stays installed.
    assert_eq!(sw.group_count(), 2);
}

#[test]
fn test_rewiring_reports_duplicate() {
    let mut sw = SoftSwitch::new();
    SnakeRunner::new(TopologyPlanner::new(), &mut sw)
        .run(1, 4, 10)
        .unwrap();
    let err = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
        .run(1, 4, 10)
        .unwrap_err();
    assert!(matches!(err, SnakeError::ClassificationInstall { port: 1, .. }));
}

#[test]
#[cfg(not(feature = "ofdpa-link"))]
fn test_rpc_client_unavailable() {
    let err = ofdpa::RpcClient::initialize("OFDPA_patch").unwrap_err();
    assert!(matches!(SnakeError::session(err), SnakeError::Session { .. }));
}
