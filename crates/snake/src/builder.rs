//! Pipeline entry builder.
//!
//! Derives the OF-DPA entries that turn a port pair into a patch cable and
//! submits them through a [`ControlPlane`]. Per pair:
//!
//! 1. VLAN table entries on both ports (one tagged match, plus a tag-absent
//!    match for untagged snakes), rewriting to the internal VLAN.
//! 2. For each direction: an L2 interface group on the output port, its
//!    single bucket, then an ACL policy entry on the input port that
//!    redirects to the group.
//!
//! The bucket is always attached before the ACL entry that references the
//! group is installed. Nothing is rolled back on failure.

use ofdpa::{
    ControlPlane, FlowEntry, GroupEntry, GroupId, L2InterfaceBucket, OfdpaError,
    PolicyAclFlowEntry, VlanFlowEntry,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{ForwardingStage, SnakeError, SnakeResult};
use crate::types::{PortId, PortPair, VlanTag};

/// VLAN table entries for one port.
pub fn classification_entries(port: PortId, vlan: VlanTag) -> Vec<VlanFlowEntry> {
    vlan.classification_matches()
        .into_iter()
        .map(|m| VlanFlowEntry::new(port, m).with_new_vlan(vlan.internal_vlan()))
        .collect()
}

/// Entries that forward everything arriving on `in_port` out of `out_port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingEntries {
    pub in_port: PortId,
    pub out_port: PortId,
    pub group: GroupEntry,
    pub bucket: L2InterfaceBucket,
    pub acl: PolicyAclFlowEntry,
}

impl ForwardingEntries {
    /// Derives the group, bucket and ACL entry for one direction.
    ///
    /// The group id depends only on the internal VLAN and `out_port`.
    pub fn derive(in_port: PortId, out_port: PortId, vlan: VlanTag) -> Self {
        let group = GroupEntry::l2_interface(vlan.internal_vlan(), out_port);
        let bucket = L2InterfaceBucket::new(&group, out_port, vlan.pops_tag());
        let acl = PolicyAclFlowEntry::redirect(in_port, group.group_id);
        Self {
            in_port,
            out_port,
            group,
            bucket,
            acl,
        }
    }

    pub fn group_id(&self) -> GroupId {
        self.group.group_id
    }
}

/// Every entry needed for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairEntries {
    pub pair: PortPair,
    pub vlan: VlanTag,
    pub classification: Vec<VlanFlowEntry>,
    pub forwarding: Vec<ForwardingEntries>,
}

impl PairEntries {
    /// Derives the entries for `pair` without touching the switch.
    pub fn derive(pair: PortPair, vlan: VlanTag) -> Self {
        let classification = pair
            .ports()
            .iter()
            .flat_map(|&port| classification_entries(port, vlan))
            .collect();
        let forwarding = pair
            .directions()
            .iter()
            .map(|&(in_port, out_port)| ForwardingEntries::derive(in_port, out_port, vlan))
            .collect();
        Self {
            pair,
            vlan,
            classification,
            forwarding,
        }
    }
}

/// Counts of entries installed for one or more pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InstallCounts {
    pub vlan_flows: usize,
    pub groups: usize,
    pub buckets: usize,
    pub acl_flows: usize,
}

impl InstallCounts {
    pub fn total(&self) -> usize {
        self.vlan_flows + self.groups + self.buckets + self.acl_flows
    }

    pub fn add(&mut self, other: InstallCounts) {
        self.vlan_flows += other.vlan_flows;
        self.groups += other.groups;
        self.buckets += other.buckets;
        self.acl_flows += other.acl_flows;
    }
}

/// Submits derived entries to a control plane.
///
/// Owns its control plane handle. Pass `&mut plane` to keep using the
/// plane afterwards.
pub struct PipelineBuilder<C: ControlPlane> {
    plane: C,
}

impl<C: ControlPlane> PipelineBuilder<C> {
    pub fn new(plane: C) -> Self {
        Self { plane }
    }

    pub fn into_plane(self) -> C {
        self.plane
    }

    /// Installs the VLAN table entries for `port`.
    ///
    /// Returns the number of entries installed (1 tagged, 2 untagged).
    #[instrument(skip(self))]
    pub fn install_vlan_classification(
        &mut self,
        port: PortId,
        vlan: VlanTag,
    ) -> SnakeResult<usize> {
        let entries = classification_entries(port, vlan);
        for entry in &entries {
            self.plane
                .flow_add(&FlowEntry::from(entry.clone()))
                .map_err(|e| SnakeError::classification(port, e))?;
            debug!("Installed {}", entry);
        }
        Ok(entries.len())
    }

    /// Installs group, bucket and ACL redirect for `in_port -> out_port`.
    ///
    /// Uses the group id returned by the control plane for the bucket and
    /// the ACL entry.
    #[instrument(skip(self))]
    pub fn install_forwarding(
        &mut self,
        in_port: PortId,
        out_port: PortId,
        vlan: VlanTag,
    ) -> SnakeResult<GroupId> {
        let fwd = ForwardingEntries::derive(in_port, out_port, vlan);
        let fail = |stage: ForwardingStage| {
            move |e: OfdpaError| SnakeError::forwarding(in_port, out_port, stage, e)
        };

        let group_id = self
            .plane
            .group_add(&fwd.group)
            .map_err(fail(ForwardingStage::Group))?;

        let bucket = L2InterfaceBucket {
            group_id,
            ..fwd.bucket
        };
        self.plane
            .group_bucket_add(&bucket)
            .map_err(fail(ForwardingStage::Bucket))?;

        let acl = PolicyAclFlowEntry {
            group_id,
            ..fwd.acl
        };
        self.plane
            .flow_add(&FlowEntry::from(acl))
            .map_err(fail(ForwardingStage::Acl))?;

        debug!("Installed forwarding {} -> {} via group {}", in_port, out_port, group_id);
        Ok(group_id)
    }

    /// Wires both directions of `pair`.
    ///
    /// VLAN entries for both ports go in first, then forwarding A to B and
    /// B to A. Stops at the first failure.
    #[instrument(skip(self, pair), fields(pair = %pair))]
    pub fn wire(&mut self, pair: PortPair, vlan: VlanTag) -> SnakeResult<InstallCounts> {
        let mut counts = InstallCounts::default();

        for port in pair.ports() {
            counts.vlan_flows += self.install_vlan_classification(port, vlan)?;
        }
        for (in_port, out_port) in pair.directions() {
            self.install_forwarding(in_port, out_port, vlan)?;
            counts.groups += 1;
            counts.buckets += 1;
            counts.acl_flows += 1;
        }

        info!("Wired {} on {}", pair, vlan);
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofdpa::{FlowTableId, OfdpaStatus, SoftOp, SoftSwitch, VlanMatch};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tagged_classification() {
        let entries = classification_entries(5, VlanTag::Tagged(10));
        assert_eq!(
            entries,
            vec![VlanFlowEntry::new(5, VlanMatch::Tagged(10)).with_new_vlan(10)]
        );
    }

    #[test]
    fn test_untagged_classification() {
        let entries = classification_entries(5, VlanTag::Untagged);
        assert_eq!(
            entries,
            vec![
                VlanFlowEntry::new(5, VlanMatch::Tagged(1)).with_new_vlan(1),
                VlanFlowEntry::new(5, VlanMatch::Absent).with_new_vlan(1),
            ]
        );
    }

    #[test]
    fn test_forwarding_entries() {
        let fwd = ForwardingEntries::derive(1, 2, VlanTag::Tagged(10));
        assert_eq!(fwd.group_id(), GroupId::l2_interface(10, 2));
        assert_eq!(fwd.bucket.output_port, 2);
        assert!(!fwd.bucket.pop_vlan_tag);
        assert_eq!(fwd.acl.in_port, 1);
        assert_eq!(fwd.acl.group_id, fwd.group_id());

        let fwd = ForwardingEntries::derive(2, 1, VlanTag::Untagged);
        assert_eq!(fwd.group_id(), GroupId::l2_interface(1, 1));
        assert!(fwd.bucket.pop_vlan_tag);
    }

    #[test]
    fn test_group_id_derivation_is_idempotent() {
        let first = ForwardingEntries::derive(3, 4, VlanTag::Tagged(100));
        let second = ForwardingEntries::derive(3, 4, VlanTag::Tagged(100));
        assert_eq!(first.group_id(), second.group_id());
        assert_eq!(first, second);
    }

    #[test]
    fn test_pair_entries() {
        let entries = PairEntries::derive(PortPair::starting_at(1), VlanTag::Untagged);
        assert_eq!(entries.classification.len(), 4);
        assert_eq!(entries.forwarding.len(), 2);
        assert_eq!(entries.forwarding[0].in_port, 1);
        assert_eq!(entries.forwarding[0].out_port, 2);
        assert_eq!(entries.forwarding[1].in_port, 2);
        assert_eq!(entries.forwarding[1].out_port, 1);
    }

    #[test]
    fn test_wire_tagged_pair() {
        let mut sw = SoftSwitch::new();
        let counts = PipelineBuilder::new(&mut sw)
            .wire(PortPair::starting_at(1), VlanTag::Tagged(10))
            .unwrap();

        assert_eq!(
            counts,
            InstallCounts {
                vlan_flows: 2,
                groups: 2,
                buckets: 2,
                acl_flows: 2,
            }
        );
        assert_eq!(sw.flows(FlowTableId::Vlan).len(), 2);
        assert_eq!(sw.flows(FlowTableId::AclPolicy).len(), 2);
        assert_eq!(sw.group_count(), 2);

        let to_b = sw.bucket(GroupId::l2_interface(10, 2)).unwrap();
        assert_eq!(to_b.output_port, 2);
        assert!(!to_b.pop_vlan_tag);
    }

    #[test]
    fn test_wire_untagged_pair() {
        let mut sw = SoftSwitch::new();
        let counts = PipelineBuilder::new(&mut sw)
            .wire(PortPair::starting_at(7), VlanTag::Untagged)
            .unwrap();

        assert_eq!(counts.vlan_flows, 4);
        assert!(sw.bucket(GroupId::l2_interface(1, 7)).unwrap().pop_vlan_tag);
        assert!(sw.bucket(GroupId::l2_interface(1, 8)).unwrap().pop_vlan_tag);
    }

    #[test]
    fn test_install_order() {
        let mut sw = SoftSwitch::new();
        PipelineBuilder::new(&mut sw)
            .wire(PortPair::starting_at(1), VlanTag::Tagged(10))
            .unwrap();

        use SoftOp::*;
        assert_eq!(
            sw.journal(),
            &[
                FlowAdd,
                FlowAdd,
                GroupAdd,
                GroupBucketAdd,
                FlowAdd,
                GroupAdd,
                GroupBucketAdd,
                FlowAdd,
            ]
        );
    }

    #[test]
    fn test_classification_failure() {
        let mut sw = SoftSwitch::new().fail_call(2, OfdpaStatus::Full);
        let err = PipelineBuilder::new(&mut sw)
            .wire(PortPair::starting_at(1), VlanTag::Tagged(10))
            .unwrap_err();

        assert!(matches!(err, SnakeError::ClassificationInstall { port: 2, .. }));
        assert_eq!(sw.flow_count(), 1);
        assert_eq!(sw.calls(), 2);
    }

    #[test]
    fn test_forwarding_failure_names_stage() {
        // Calls 1-2 are VLAN flows, 3 is the first group, 4 its bucket.
        let mut sw = SoftSwitch::new().fail_call(4, OfdpaStatus::Error);
        let err = PipelineBuilder::new(&mut sw)
            .wire(PortPair::starting_at(1), VlanTag::Tagged(10))
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
            other => panic!("unexpected error: {other}"),
        }
        assert!(sw.has_group(GroupId::l2_interface(10, 2)));
        assert!(sw.flows(FlowTableId::AclPolicy).is_empty());
    }

    #[test]
    fn test_duplicate_install_is_reported() {
        let mut sw = SoftSwitch::new();
        let mut builder = PipelineBuilder::new(&mut sw);
        builder.install_forwarding(1, 2, VlanTag::Tagged(10)).unwrap();
        let err = builder
            .install_forwarding(1, 2, VlanTag::Tagged(10))
            .unwrap_err();
        assert!(matches!(
            err,
            SnakeError::ForwardingInstall {
                stage: ForwardingStage::Group,
                ..
            }
        ));
    }
}
