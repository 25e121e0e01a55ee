//! Flow entries for the OF-DPA VLAN and ACL policy tables.

use serde::Serialize;
use std::fmt;

use crate::error::{OfdpaError, OfdpaResult};
use crate::types::{FlowTableId, GroupId, PortNo, VlanMatch, INPORT_EXACT_MASK, VLAN_ID_MAX};

/// Entry in the VLAN flow table (`ofdpaVlanFlowEntry_t`).
///
/// Classifies frames arriving on `in_port` and sends them on to the next
/// table with the VLAN rewritten to `new_vlan_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VlanFlowEntry {
    pub in_port: PortNo,
    pub vlan_match: VlanMatch,
    pub goto_table: FlowTableId,
    /// `setVlanIdAction` / `newVlanId`. `None` leaves the VLAN alone.
    pub new_vlan_id: Option<u16>,
}

impl VlanFlowEntry {
    /// Creates an entry that jumps to the Termination MAC table.
    pub fn new(in_port: PortNo, vlan_match: VlanMatch) -> Self {
        Self {
            in_port,
            vlan_match,
            goto_table: FlowTableId::TerminationMac,
            new_vlan_id: None,
        }
    }

    /// Sets the VLAN rewrite action.
    pub fn with_new_vlan(mut self, vlan_id: u16) -> Self {
        self.new_vlan_id = Some(vlan_id);
        self
    }

    /// Returns the raw `(inPort, vlanId, vlanIdMask)` match key.
    pub fn match_key(&self) -> (PortNo, u16, u16) {
        let (vlan_id, mask) = self.vlan_match.encode();
        (self.in_port, vlan_id, mask)
    }

    pub fn validate(&self) -> OfdpaResult<()> {
        if self.in_port == 0 {
            return Err(OfdpaError::invalid_parameter("VLAN flow inPort is 0"));
        }
        if let VlanMatch::Tagged(vid) = self.vlan_match {
            if vid == 0 || vid > VLAN_ID_MAX {
                return Err(OfdpaError::invalid_parameter(format!(
                    "VLAN flow matches invalid vid {}",
                    vid
                )));
            }
        }
        if let Some(vid) = self.new_vlan_id {
            if vid == 0 || vid > VLAN_ID_MAX {
                return Err(OfdpaError::invalid_parameter(format!(
                    "VLAN flow rewrites to invalid vid {}",
                    vid
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for VlanFlowEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vlan-flow in_port={} {}", self.in_port, self.vlan_match)?;
        if let Some(vid) = self.new_vlan_id {
            write!(f, " set_vlan={}", vid)?;
        }
        write!(f, " goto={}", self.goto_table)
    }
}

/// Entry in the ACL policy flow table (`ofdpaPolicyAclFlowEntry_t`).
///
/// Only the fields the patch panel sets are modelled: an in-port match and
/// a group redirect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PolicyAclFlowEntry {
    pub in_port: PortNo,
    pub in_port_mask: u32,
    pub group_id: GroupId,
}

impl PolicyAclFlowEntry {
    /// Creates an exact in-port match that forwards through `group_id`.
    pub fn redirect(in_port: PortNo, group_id: GroupId) -> Self {
        Self {
            in_port,
            in_port_mask: INPORT_EXACT_MASK,
            group_id,
        }
    }

    pub fn match_key(&self) -> (PortNo, u32) {
        (self.in_port, self.in_port_mask)
    }

    pub fn validate(&self) -> OfdpaResult<()> {
        if self.in_port == 0 {
            return Err(OfdpaError::invalid_parameter("ACL flow inPort is 0"));
        }
        Ok(())
    }
}

impl fmt::Display for PolicyAclFlowEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "acl-flow in_port={}/0x{:x} group={}",
            self.in_port, self.in_port_mask, self.group_id
        )
    }
}

/// A flow entry for any table the patch panel writes (`ofdpaFlowEntry_t`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum FlowEntry {
    Vlan(VlanFlowEntry),
    AclPolicy(PolicyAclFlowEntry),
}

impl FlowEntry {
    pub fn table_id(&self) -> FlowTableId {
        match self {
            FlowEntry::Vlan(_) => FlowTableId::Vlan,
            FlowEntry::AclPolicy(_) => FlowTableId::AclPolicy,
        }
    }

    pub fn in_port(&self) -> PortNo {
        match self {
            FlowEntry::Vlan(e) => e.in_port,
            FlowEntry::AclPolicy(e) => e.in_port,
        }
    }

    pub fn validate(&self) -> OfdpaResult<()> {
        match self {
            FlowEntry::Vlan(e) => e.validate(),
            FlowEntry::AclPolicy(e) => e.validate(),
        }
    }
}

impl From<VlanFlowEntry> for FlowEntry {
    fn from(entry: VlanFlowEntry) -> Self {
        FlowEntry::Vlan(entry)
    }
}

impl From<PolicyAclFlowEntry> for FlowEntry {
    fn from(entry: PolicyAclFlowEntry) -> Self {
        FlowEntry::AclPolicy(entry)
    }
}

impl fmt::Display for FlowEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowEntry::Vlan(e) => fmt::Display::fmt(e, f),
            FlowEntry::AclPolicy(e) => fmt::Display::fmt(e, f),
        }
    }
}
