//! Bit-packed OF-DPA identifiers and match encodings.
//!
//! The OF-DPA client API overloads plain integers with presence bits and
//! packed sub-fields. The types here keep that packing in one place so callers
//! can work with tagged values instead.

use serde::Serialize;
use std::fmt;

/// `OFDPA_VID_PRESENT`: set in a VLAN match when a tag is on the frame.
pub const VID_PRESENT: u16 = 0x1000;

/// `OFDPA_VID_NONE`: VLAN match value for frames without a tag.
pub const VID_NONE: u16 = 0x0000;

/// `OFDPA_VID_EXACT_MASK`: all twelve VLAN id bits.
pub const VID_EXACT_MASK: u16 = 0x0fff;

/// Mask used with [`VID_NONE`] for tag-absent matches.
///
/// This includes the present bit. Verify against the target ASIC's
/// documentation before relying on it for anything but the patch panel.
pub const VID_ABSENT_MASK: u16 = 0x1fff;

/// `OFDPA_INPORT_EXACT_MASK`.
pub const INPORT_EXACT_MASK: u32 = 0xffff_ffff;

/// Highest 12-bit VLAN id.
pub const VLAN_ID_MAX: u16 = 4095;

/// Physical port number as seen by OF-DPA.
pub type PortNo = u32;

/// Highest port number an L2 interface group id can carry (16 bits).
pub const PORT_NO_MAX: PortNo = 0xffff;

/// OF-DPA flow table identifiers used by the patch panel.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FlowTableId {
    /// `OFDPA_FLOW_TABLE_ID_VLAN`
    Vlan = 10,
    /// `OFDPA_FLOW_TABLE_ID_TERMINATION_MAC`
    TerminationMac = 20,
    /// `OFDPA_FLOW_TABLE_ID_ACL_POLICY`
    AclPolicy = 60,
}

impl FlowTableId {
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for FlowTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowTableId::Vlan => "VLAN",
            FlowTableId::TerminationMac => "TERMINATION_MAC",
            FlowTableId::AclPolicy => "ACL_POLICY",
        };
        write!(f, "{}", s)
    }
}

/// A VLAN table match condition.
///
/// Translates to the hardware's `(vlanId, vlanIdMask)` pair through
/// [`VlanMatch::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VlanMatch {
    /// Frame carries exactly this 802.1Q VLAN id.
    Tagged(u16),
    /// Frame carries no 802.1Q tag.
    Absent,
}

impl VlanMatch {
    /// Returns the bit-packed `(vlanId, vlanIdMask)` match fields.
    pub const fn encode(self) -> (u16, u16) {
        match self {
            VlanMatch::Tagged(vid) => (
                VID_PRESENT | (vid & VID_EXACT_MASK),
                VID_PRESENT | VID_EXACT_MASK,
            ),
            VlanMatch::Absent => (VID_NONE, VID_ABSENT_MASK),
        }
    }

    /// Reverses [`VlanMatch::encode`].
    pub const fn decode(vlan_id: u16, mask: u16) -> Option<Self> {
        if vlan_id & VID_PRESENT != 0 {
            Some(VlanMatch::Tagged(vlan_id & VID_EXACT_MASK))
        } else if vlan_id == VID_NONE && mask == VID_ABSENT_MASK {
            Some(VlanMatch::Absent)
        } else {
            None
        }
    }
}

impl fmt::Display for VlanMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VlanMatch::Tagged(vid) => write!(f, "vlan {}", vid),
            VlanMatch::Absent => write!(f, "untagged"),
        }
    }
}

/// OF-DPA group types (top nibble of a group id).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupType {
    /// `OFDPA_GROUP_ENTRY_TYPE_L2_INTERFACE`
    L2Interface = 0,
    /// `OFDPA_GROUP_ENTRY_TYPE_L2_REWRITE`
    L2Rewrite = 1,
    /// `OFDPA_GROUP_ENTRY_TYPE_L3_UNICAST`
    L3Unicast = 2,
    /// `OFDPA_GROUP_ENTRY_TYPE_L2_MULTICAST`
    L2Multicast = 3,
    /// `OFDPA_GROUP_ENTRY_TYPE_L2_FLOOD`
    L2Flood = 4,
}

impl GroupType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(GroupType::L2Interface),
            1 => Some(GroupType::L2Rewrite),
            2 => Some(GroupType::L3Unicast),
            3 => Some(GroupType::L2Multicast),
            4 => Some(GroupType::L2Flood),
            _ => None,
        }
    }
}

/// A packed OF-DPA group identifier.
///
/// Layout: type in bits 28-31, VLAN in bits 16-27, port in bits 0-15. The
/// id is a pure function of its parts, so deriving it twice from the same
/// inputs yields the same key.
///
/// # Examples
///
/// ```
/// use ofdpa::GroupId;
///
/// let id = GroupId::l2_interface(10, 2);
/// assert_eq!(id.as_raw(), 0x000a_0002);
/// assert_eq!(id.vlan_id(), 10);
/// assert_eq!(id.port(), 2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupId(u32);

impl GroupId {
    const TYPE_SHIFT: u32 = 28;
    const VLAN_SHIFT: u32 = 16;
    const VLAN_MASK: u32 = 0x0fff;
    const PORT_MASK: u32 = PORT_NO_MAX;

    /// Builds an L2 interface group id (`ofdpaGroupTypeSet`,
    /// `ofdpaGroupVlanSet`, `ofdpaGroupPortIdSet`).
    ///
    /// `port` must not exceed [`PORT_NO_MAX`]; wider ports would alias
    /// another port's group.
    pub const fn l2_interface(vlan_id: u16, port: PortNo) -> Self {
        debug_assert!(port <= PORT_NO_MAX, "port does not fit a group id");
        GroupId(
            ((GroupType::L2Interface as u32) << Self::TYPE_SHIFT)
                | (((vlan_id as u32) & Self::VLAN_MASK) << Self::VLAN_SHIFT)
                | (port & Self::PORT_MASK),
        )
    }

    pub const fn from_raw(raw: u32) -> Self {
        GroupId(raw)
    }

    pub const fn as_raw(&self) -> u32 {
        self.0
    }

    /// Returns the group type, if the top nibble holds a known type.
    pub fn group_type(&self) -> Option<GroupType> {
        GroupType::from_raw(self.0 >> Self::TYPE_SHIFT)
    }

    pub const fn vlan_id(&self) -> u16 {
        ((self.0 >> Self::VLAN_SHIFT) & Self::VLAN_MASK) as u16
    }

    pub const fn port(&self) -> PortNo {
        self.0 & Self::PORT_MASK
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId(0x{:08x})", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
