//! In-memory OF-DPA control plane.
//!
//! `SoftSwitch` keeps the flow and group tables in ordinary collections and
//! enforces the same key and reference rules the switch agent does. It backs
//! dry runs and tests.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::api::{ControlPlane, FlowEntry, GroupEntry, L2InterfaceBucket};
use crate::error::{OfdpaError, OfdpaResult, OfdpaStatus};
use crate::types::{FlowTableId, GroupId, PortNo};

/// Default per-table capacity.
pub const DEFAULT_TABLE_CAPACITY: usize = 4096;

/// Identifies one of the three client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoftOp {
    FlowAdd,
    GroupAdd,
    GroupBucketAdd,
}

/// A scripted failure: the `nth` call (1-based, counted across all calls)
/// returns `status` instead of being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub nth: usize,
    pub status: OfdpaStatus,
}

/// Flow table key, as the agent compares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum FlowKey {
    Vlan { in_port: PortNo, vlan_id: u16, mask: u16 },
    AclPolicy { in_port: PortNo, mask: u32 },
}

impl FlowKey {
    fn of(entry: &FlowEntry) -> Self {
        match entry {
            FlowEntry::Vlan(e) => {
                let (in_port, vlan_id, mask) = e.match_key();
                FlowKey::Vlan {
                    in_port,
                    vlan_id,
                    mask,
                }
            }
            FlowEntry::AclPolicy(e) => {
                let (in_port, mask) = e.match_key();
                FlowKey::AclPolicy { in_port, mask }
            }
        }
    }
}

/// In-memory switch implementing [`ControlPlane`].
#[derive(Debug)]
pub struct SoftSwitch {
    capacity: usize,
    flows: BTreeMap<FlowKey, FlowEntry>,
    groups: BTreeMap<GroupId, Option<L2InterfaceBucket>>,
    /// Every successfully applied call, in order.
    journal: Vec<SoftOp>,
    calls: usize,
    faults: Vec<Fault>,
}

impl Default for SoftSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftSwitch {
    /// Creates an empty switch with [`DEFAULT_TABLE_CAPACITY`] per table.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TABLE_CAPACITY)
    }

    /// Creates an empty switch whose tables hold at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            flows: BTreeMap::new(),
            groups: BTreeMap::new(),
            journal: Vec::new(),
            calls: 0,
            faults: Vec::new(),
        }
    }

    /// Scripts the `nth` call (1-based) to fail with `status`.
    pub fn fail_call(mut self, nth: usize, status: OfdpaStatus) -> Self {
        self.faults.push(Fault { nth, status });
        self
    }

    /// Number of calls received, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Successfully applied calls, in order.
    pub fn journal(&self) -> &[SoftOp] {
        &self.journal
    }

    /// Installed flow entries of one table, in key order.
    pub fn flows(&self, table: FlowTableId) -> Vec<&FlowEntry> {
        self.flows
            .values()
            .filter(|e| e.table_id() == table)
            .collect()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns the bucket attached to `group_id`, if the group exists and
    /// has one.
    pub fn bucket(&self, group_id: GroupId) -> Option<&L2InterfaceBucket> {
        self.groups.get(&group_id).and_then(|b| b.as_ref())
    }

    pub fn has_group(&self, group_id: GroupId) -> bool {
        self.groups.contains_key(&group_id)
    }

    fn table_len(&self, table: FlowTableId) -> usize {
        self.flows.values().filter(|e| e.table_id() == table).count()
    }

    /// Counts the call and fires a scripted fault if one matches.
    fn enter(&mut self, op: SoftOp) -> OfdpaResult<()> {
        self.calls += 1;
        let call = self.calls;
        if let Some(fault) = self.faults.iter().find(|f| f.nth == call) {
            warn!("soft switch: injected {} on call {} ({:?})", fault.status, call, op);
            return Err(OfdpaError::from_status(fault.status));
        }
        Ok(())
    }
}

impl ControlPlane for SoftSwitch {
    fn flow_add(&mut self, entry: &FlowEntry) -> OfdpaResult<()> {
        self.enter(SoftOp::FlowAdd)?;
        entry.validate()?;

        let key = FlowKey::of(entry);
        if self.flows.contains_key(&key) {
            return Err(OfdpaError::already_exists(entry.to_string()));
        }
        if self.table_len(entry.table_id()) >= self.capacity {
            return Err(OfdpaError::table_full(entry.table_id().to_string()));
        }
        if let FlowEntry::AclPolicy(acl) = entry {
            if self.bucket(acl.group_id).is_none() {
                return Err(OfdpaError::not_found(format!(
                    "group {} with a bucket",
                    acl.group_id
                )));
            }
        }

        debug!("soft switch: add {}", entry);
        self.flows.insert(key, entry.clone());
        self.journal.push(SoftOp::FlowAdd);
        Ok(())
    }

    fn group_add(&mut self, group: &GroupEntry) -> OfdpaResult<GroupId> {
        self.enter(SoftOp::GroupAdd)?;
        group.validate()?;

        if self.groups.contains_key(&group.group_id) {
            return Err(OfdpaError::already_exists(group.to_string()));
        }
        if self.groups.len() >= self.capacity {
            return Err(OfdpaError::table_full("GROUP"));
        }

        debug!("soft switch: add {}", group);
        self.groups.insert(group.group_id, None);
        self.journal.push(SoftOp::GroupAdd);
        Ok(group.group_id)
    }

    fn group_bucket_add(&mut self, bucket: &L2InterfaceBucket) -> OfdpaResult<()> {
        self.enter(SoftOp::GroupBucketAdd)?;
        bucket.validate()?;

        let slot = self
            .groups
            .get_mut(&bucket.group_id)
            .ok_or_else(|| OfdpaError::not_found(format!("group {}", bucket.group_id)))?;
        if slot.is_some() {
            return Err(OfdpaError::already_exists(bucket.to_string()));
        }

        debug!("soft switch: add {}", bucket);
        *slot = Some(*bucket);
        self.journal.push(SoftOp::GroupBucketAdd);
        Ok(())
    }
}
