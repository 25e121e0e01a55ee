//! Type definitions for snake wiring

use serde::Serialize;
use std::fmt;

use ofdpa::types::VLAN_ID_MAX;
use ofdpa::VlanMatch;

use crate::error::{SnakeError, SnakeResult};

/// Physical switch port number.
pub type PortId = ofdpa::PortNo;

/// VLAN used inside the pipeline for untagged traffic.
pub const UNTAGGED_INTERNAL_VLAN: u16 = 1;

/// VLAN handling requested for the snake.
///
/// The raw VLAN id 0 selects [`VlanTag::Untagged`]; any other valid id is
/// carried on the wire as an 802.1Q tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VlanTag {
    /// Frames arrive and leave without a tag.
    Untagged,
    /// Frames carry this VLAN id (1-4095).
    Tagged(u16),
}

impl VlanTag {
    /// Parses a raw VLAN id, where 0 means untagged.
    ///
    /// # Errors
    ///
    /// Returns [`SnakeError::InvalidVlan`] for ids above 4095.
    pub fn from_raw(vlan_id: u32) -> SnakeResult<Self> {
        match vlan_id {
            0 => Ok(VlanTag::Untagged),
            v if v <= u32::from(VLAN_ID_MAX) => Ok(VlanTag::Tagged(v as u16)),
            _ => Err(SnakeError::InvalidVlan { vlan_id }),
        }
    }

    /// Returns the raw VLAN id (0 for untagged).
    pub fn raw(&self) -> u16 {
        match self {
            VlanTag::Untagged => 0,
            VlanTag::Tagged(vid) => *vid,
        }
    }

    /// VLAN used in every hardware match and action field. Never 0.
    pub fn internal_vlan(&self) -> u16 {
        match self {
            VlanTag::Untagged => UNTAGGED_INTERNAL_VLAN,
            VlanTag::Tagged(vid) => *vid,
        }
    }

    /// Whether egress buckets strip the tag.
    pub fn pops_tag(&self) -> bool {
        matches!(self, VlanTag::Untagged)
    }

    pub fn is_untagged(&self) -> bool {
        matches!(self, VlanTag::Untagged)
    }

    /// VLAN table matches to install on each port.
    ///
    /// The tagged match on the internal VLAN is always present. Untagged
    /// snakes add a tag-absent match; the two are mutually exclusive.
    pub fn classification_matches(&self) -> Vec<VlanMatch> {
        let mut matches = vec![VlanMatch::Tagged(self.internal_vlan())];
        if self.is_untagged() {
            matches.push(VlanMatch::Absent);
        }
        matches
    }
}

impl fmt::Display for VlanTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VlanTag::Untagged => write!(f, "untagged"),
            VlanTag::Tagged(vid) => write!(f, "vlan {}", vid),
        }
    }
}

/// Two adjacent ports that forward to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PortPair {
    pub a: PortId,
    pub b: PortId,
}

impl PortPair {
    /// Creates the pair `(port, port + 1)`.
    pub fn starting_at(port: PortId) -> Self {
        Self { a: port, b: port + 1 }
    }

    /// Both forwarding directions as `(in_port, out_port)`, A to B first.
    pub fn directions(&self) -> [(PortId, PortId); 2] {
        [(self.a, self.b), (self.b, self.a)]
    }

    pub fn ports(&self) -> [PortId; 2] {
        [self.a, self.b]
    }
}

impl fmt::Display for PortPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vlan_tag_from_raw() {
        assert_eq!(VlanTag::from_raw(0).unwrap(), VlanTag::Untagged);
        assert_eq!(VlanTag::from_raw(10).unwrap(), VlanTag::Tagged(10));
        assert_eq!(VlanTag::from_raw(4095).unwrap(), VlanTag::Tagged(4095));
        assert!(matches!(
            VlanTag::from_raw(4096),
            Err(SnakeError::InvalidVlan { vlan_id: 4096 })
        ));
    }

    #[test]
    fn test_internal_vlan_never_zero() {
        assert_eq!(VlanTag::Untagged.internal_vlan(), 1);
        assert_eq!(VlanTag::Tagged(10).internal_vlan(), 10);
        assert_eq!(VlanTag::Untagged.raw(), 0);
    }

    #[test]
    fn test_pop_tag_only_when_untagged() {
        assert!(VlanTag::Untagged.pops_tag());
        assert!(!VlanTag::Tagged(1).pops_tag());
    }

    #[test]
    fn test_classification_matches() {
        assert_eq!(
            VlanTag::Untagged.classification_matches(),
            vec![VlanMatch::Tagged(1), VlanMatch::Absent]
        );
        assert_eq!(
            VlanTag::Tagged(20).classification_matches(),
            vec![VlanMatch::Tagged(20)]
        );
    }

    #[test]
    fn test_pair_directions() {
        let pair = PortPair::starting_at(3);
        assert_eq!(pair, PortPair { a: 3, b: 4 });
        assert_eq!(pair.directions(), [(3, 4), (4, 3)]);
        assert_eq!(pair.to_string(), "3<->4");
    }
}
