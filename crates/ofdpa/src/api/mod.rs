//! OF-DPA client API surface used by the patch panel.
//!
//! - [`flow`]: VLAN and ACL policy flow entries
//! - [`group`]: L2 interface groups and buckets
//!
//! [`ControlPlane`] is the boundary to the switch agent. Callers own a
//! handle to one implementation for the whole run and pass it down
//! explicitly; there is no process-wide client.

pub mod flow;
pub mod group;

pub use flow::{FlowEntry, PolicyAclFlowEntry, VlanFlowEntry};
pub use group::{GroupEntry, L2InterfaceBucket};

use crate::error::OfdpaResult;
use crate::types::GroupId;

/// Operations the switch agent must provide.
///
/// Every call blocks until the agent answers. Any non-success return is
/// reported as an [`crate::OfdpaError`].
pub trait ControlPlane {
    /// Adds a flow entry (`ofdpaFlowAdd`).
    fn flow_add(&mut self, entry: &FlowEntry) -> OfdpaResult<()>;

    /// Adds a group entry (`ofdpaGroupAdd`) and returns its id.
    fn group_add(&mut self, group: &GroupEntry) -> OfdpaResult<GroupId>;

    /// Adds a bucket to an existing group (`ofdpaGroupBucketEntryAdd`).
    fn group_bucket_add(&mut self, bucket: &L2InterfaceBucket) -> OfdpaResult<()>;
}

impl<T: ControlPlane + ?Sized> ControlPlane for &mut T {
    fn flow_add(&mut self, entry: &FlowEntry) -> OfdpaResult<()> {
        (**self).flow_add(entry)
    }

    fn group_add(&mut self, group: &GroupEntry) -> OfdpaResult<GroupId> {
        (**self).group_add(group)
    }

    fn group_bucket_add(&mut self, bucket: &L2InterfaceBucket) -> OfdpaResult<()> {
        (**self).group_bucket_add(bucket)
    }
}

impl<T: ControlPlane + ?Sized> ControlPlane for Box<T> {
    fn flow_add(&mut self, entry: &FlowEntry) -> OfdpaResult<()> {
        (**self).flow_add(entry)
    }

    fn group_add(&mut self, group: &GroupEntry) -> OfdpaResult<GroupId> {
        (**self).group_add(group)
    }

    fn group_bucket_add(&mut self, bucket: &L2InterfaceBucket) -> OfdpaResult<()> {
        (**self).group_bucket_add(bucket)
    }
}
