//! Declarations for the OF-DPA RPC client library (`libofdpa_rpc_client`).
//!
//! Only compiled with the `ofdpa-link` feature. The structs below mirror
//! `ofdpa_datatypes.h` from the OF-DPA 2.0 client headers. Fields this crate
//! never writes are kept as reserved space; `ofdpaFlowEntryInit` zeroes the
//! whole entry before any field is set.

use std::ffi::c_char;

use crate::api::{FlowEntry, GroupEntry, L2InterfaceBucket, PolicyAclFlowEntry, VlanFlowEntry};
use crate::types::FlowTableId;

/// `OFDPA_ERROR_t`
pub(crate) type RawStatus = i32;

/// Bytes of `ofdpaPolicyAclFlowMatch_t` after `inPortMask`.
const ACL_MATCH_TAIL: usize = 136;

/// Size of the `flowData` union (its largest member).
const FLOW_DATA_SIZE: usize = 512;

/// Bytes of the `bucketData` union after the L2 interface arm.
const BUCKET_DATA_TAIL: usize = 64;

/// `ofdpaVlanFlowMatch_t`
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct RawVlanMatch {
    pub in_port: u32,
    pub vlan_id: u16,
    pub vlan_id_mask: u16,
}

/// Leading fields of `ofdpaVlanFlowEntry_t`.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct RawVlanFlowEntry {
    pub goto_table_id: u32,
    pub match_criteria: RawVlanMatch,
    pub set_vlan_id_action: u32,
    pub new_vlan_id: u16,
}

/// `ofdpaPolicyAclFlowMatch_t`, with only the in-port fields named.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct RawPolicyAclMatch {
    pub in_port: u32,
    pub in_port_mask: u32,
    _tail: [u8; ACL_MATCH_TAIL],
}

/// Leading fields of `ofdpaPolicyAclFlowEntry_t`.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct RawPolicyAclFlowEntry {
    pub match_criteria: RawPolicyAclMatch,
    pub group_id: u32,
}

/// `flowData` union of `ofdpaFlowEntry_t`.
#[repr(C)]
pub(crate) union RawFlowData {
    pub vlan: RawVlanFlowEntry,
    pub policy_acl: RawPolicyAclFlowEntry,
    _size: [u8; FLOW_DATA_SIZE],
}

/// `ofdpaFlowEntry_t`
#[repr(C)]
pub(crate) struct RawFlowEntry {
    pub table_id: u32,
    pub priority: u32,
    pub flow_data: RawFlowData,
    pub hard_time: u32,
    pub idle_time: u32,
    pub cookie: u64,
}

/// `ofdpaGroupEntry_t`
#[repr(C)]
pub(crate) struct RawGroupEntry {
    pub group_id: u32,
    pub reference_count: u32,
}

/// `ofdpaL2InterfaceGroupBucketData_t`
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct RawL2InterfaceBucketData {
    pub output_port: u32,
    pub pop_vlan_tag: u32,
    pub allow_vlan_translation: u32,
}

/// `ofdpaGroupBucketEntry_t`, with the L2 interface arm of `bucketData`.
#[repr(C)]
pub(crate) struct RawGroupBucketEntry {
    pub group_id: u32,
    pub bucket_index: u32,
    pub reference_group_id: u32,
    pub l2_interface: RawL2InterfaceBucketData,
    _bucket_data_tail: [u8; BUCKET_DATA_TAIL],
}

extern "C" {
    pub(crate) fn ofdpaClientInitialize(client_name: *const c_char) -> RawStatus;
    pub(crate) fn ofdpaFlowEntryInit(table_id: u32, flow: *mut RawFlowEntry) -> RawStatus;
    pub(crate) fn ofdpaFlowAdd(flow: *mut RawFlowEntry) -> RawStatus;
    pub(crate) fn ofdpaGroupAdd(group: *mut RawGroupEntry) -> RawStatus;
    pub(crate) fn ofdpaGroupBucketEntryAdd(bucket: *mut RawGroupBucketEntry) -> RawStatus;
}

impl RawFlowEntry {
    /// A zeroed entry, to be filled by `ofdpaFlowEntryInit`.
    pub(crate) fn zeroed(table: FlowTableId) -> Self {
        RawFlowEntry {
            table_id: table.as_raw(),
            priority: 0,
            flow_data: RawFlowData {
                _size: [0; FLOW_DATA_SIZE],
            },
            hard_time: 0,
            idle_time: 0,
            cookie: 0,
        }
    }

    /// Writes the fields of `entry` into an initialized raw entry.
    pub(crate) fn fill(&mut self, entry: &FlowEntry) {
        match entry {
            FlowEntry::Vlan(e) => self.fill_vlan(e),
            FlowEntry::AclPolicy(e) => self.fill_acl(e),
        }
    }

    fn fill_vlan(&mut self, e: &VlanFlowEntry) {
        let (in_port, vlan_id, vlan_id_mask) = e.match_key();
        // Safety: the union is plain data and the VLAN arm is selected by
        // the table id passed to ofdpaFlowEntryInit.
        let vlan = unsafe { &mut self.flow_data.vlan };
        vlan.goto_table_id = e.goto_table.as_raw();
        vlan.match_criteria = RawVlanMatch {
            in_port,
            vlan_id,
            vlan_id_mask,
        };
        if let Some(new_vlan) = e.new_vlan_id {
            vlan.set_vlan_id_action = 1;
            vlan.new_vlan_id = new_vlan;
        }
    }

    fn fill_acl(&mut self, e: &PolicyAclFlowEntry) {
        let (in_port, in_port_mask) = e.match_key();
        // Safety: as above, for the policy ACL arm.
        let acl = unsafe { &mut self.flow_data.policy_acl };
        acl.match_criteria.in_port = in_port;
        acl.match_criteria.in_port_mask = in_port_mask;
        acl.group_id = e.group_id.as_raw();
    }
}

impl From<&GroupEntry> for RawGroupEntry {
    fn from(group: &GroupEntry) -> Self {
        RawGroupEntry {
            group_id: group.group_id.as_raw(),
            reference_count: 0,
        }
    }
}

impl From<&L2InterfaceBucket> for RawGroupBucketEntry {
    fn from(bucket: &L2InterfaceBucket) -> Self {
        RawGroupBucketEntry {
            group_id: bucket.group_id.as_raw(),
            bucket_index: bucket.bucket_index,
            reference_group_id: 0,
            l2_interface: RawL2InterfaceBucketData {
                output_port: bucket.output_port,
                pop_vlan_tag: u32::from(bucket.pop_vlan_tag),
                allow_vlan_translation: 0,
            },
            _bucket_data_tail: [0; BUCKET_DATA_TAIL],
        }
    }
}
