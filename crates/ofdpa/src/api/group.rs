//! L2 interface groups and their buckets.

use serde::Serialize;
use std::fmt;

use crate::error::{OfdpaError, OfdpaResult};
use crate::types::{GroupId, GroupType, PortNo};

/// Group table entry (`ofdpaGroupEntry_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GroupEntry {
    pub group_id: GroupId,
}

impl GroupEntry {
    /// Creates the L2 interface group for `(vlan_id, port)`.
    pub fn l2_interface(vlan_id: u16, port: PortNo) -> Self {
        Self {
            group_id: GroupId::l2_interface(vlan_id, port),
        }
    }

    pub fn validate(&self) -> OfdpaResult<()> {
        if self.group_id.group_type() != Some(GroupType::L2Interface) {
            return Err(OfdpaError::invalid_parameter(format!(
                "group {} is not an L2 interface group",
                self.group_id
            )));
        }
        if self.group_id.vlan_id() == 0 {
            return Err(OfdpaError::invalid_parameter(format!(
                "group {} uses VLAN 0",
                self.group_id
            )));
        }
        Ok(())
    }
}

/// L2 interface bucket (`ofdpaGroupBucketEntry_t` with `l2Interface` data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct L2InterfaceBucket {
    pub group_id: GroupId,
    pub bucket_index: u32,
    pub output_port: PortNo,
    pub pop_vlan_tag: bool,
}

impl L2InterfaceBucket {
    /// Creates bucket 0 for `group`.
    pub fn new(group: &GroupEntry, output_port: PortNo, pop_vlan_tag: bool) -> Self {
        Self {
            group_id: group.group_id,
            bucket_index: 0,
            output_port,
            pop_vlan_tag,
        }
    }

    pub fn validate(&self) -> OfdpaResult<()> {
        if self.output_port != self.group_id.port() {
            return Err(OfdpaError::invalid_parameter(format!(
                "bucket output port {} does not match group {}",
                self.output_port, self.group_id
            )));
        }
        Ok(())
    }
}

impl fmt::Display for GroupEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "l2-interface-group {} vlan={} port={}",
            self.group_id,
            self.group_id.vlan_id(),
            self.group_id.port()
        )
    }
}

impl fmt::Display for L2InterfaceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bucket {}[{}] output={} pop_vlan={}",
            self.group_id, self.bucket_index, self.output_port, self.pop_vlan_tag
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bucket_follows_group() {
        let group = GroupEntry::l2_interface(10, 4);
        let bucket = L2InterfaceBucket::new(&group, 4, false);
        assert_eq!(bucket.group_id, group.group_id);
        assert_eq!(bucket.bucket_index, 0);
        assert!(bucket.validate().is_ok());
    }

    #[test]
    fn test_bucket_port_mismatch() {
        let group = GroupEntry::l2_interface(10, 4);
        assert!(L2InterfaceBucket::new(&group, 5, false).validate().is_err());
    }

    #[test]
    fn test_group_rejects_vlan_zero() {
        assert!(GroupEntry::l2_interface(0, 4).validate().is_err());
        assert!(GroupEntry::l2_interface(1, 4).validate().is_ok());
    }
}
