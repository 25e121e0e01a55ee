//! Session to the OF-DPA agent running on the switch.
//!
//! The agent serves the client API over RPC (`ofdpaClientInitialize`). The
//! RPC transport comes from the vendor client library, linked in with the
//! `ofdpa-link` feature. Without it every session reports
//! [`OfdpaError::Session`].

use log::{error, info};

use crate::api::{ControlPlane, FlowEntry, GroupEntry, L2InterfaceBucket};
use crate::error::{OfdpaError, OfdpaResult};
use crate::types::GroupId;

#[cfg(feature = "ofdpa-link")]
use crate::error::OfdpaStatusExt;
#[cfg(feature = "ofdpa-link")]
use crate::ffi;

/// Client name used when the caller does not pick one.
pub const DEFAULT_CLIENT_NAME: &str = "OFDPA_patch";

#[cfg(not(feature = "ofdpa-link"))]
const TRANSPORT_MISSING: &str = "OF-DPA RPC transport is not linked into this build";

/// An RPC session to the switch agent.
#[derive(Debug)]
pub struct RpcClient {
    client_name: String,
}

fn check_client_name(client_name: &str) -> OfdpaResult<()> {
    if client_name.is_empty() {
        return Err(OfdpaError::invalid_parameter("client name cannot be empty"));
    }
    Ok(())
}

impl RpcClient {
    /// Opens a session registered under `client_name`.
    ///
    /// # Errors
    ///
    /// Returns [`OfdpaError::InvalidParameter`] for an empty name and
    /// [`OfdpaError::Session`] if the agent cannot be reached.
    #[cfg(feature = "ofdpa-link")]
    pub fn initialize(client_name: &str) -> OfdpaResult<Self> {
        check_client_name(client_name)?;
        let name = std::ffi::CString::new(client_name)
            .map_err(|_| OfdpaError::invalid_parameter("client name contains a NUL byte"))?;

        info!("Initializing OF-DPA client '{}'", client_name);

        // Safety: name is NUL-terminated and outlives the call.
        let rc = unsafe { ffi::ofdpaClientInitialize(name.as_ptr()) };
        rc.to_result().map_err(|e| {
            error!("Cannot initialize OF-DPA client '{}': {}", client_name, e);
            match e {
                OfdpaError::Session { .. } => e,
                other => OfdpaError::session(other.to_string()),
            }
        })?;

        Ok(Self {
            client_name: client_name.to_string(),
        })
    }

    /// Opens a session registered under `client_name`.
    ///
    /// # Errors
    ///
    /// Returns [`OfdpaError::InvalidParameter`] for an empty name and
    /// [`OfdpaError::Session`] otherwise, since no transport is linked.
    #[cfg(not(feature = "ofdpa-link"))]
    pub fn initialize(client_name: &str) -> OfdpaResult<Self> {
        check_client_name(client_name)?;

        info!("Initializing OF-DPA client '{}'", client_name);
        error!(
            "Cannot initialize OF-DPA client '{}': {}",
            client_name, TRANSPORT_MISSING
        );
        Err(OfdpaError::session(TRANSPORT_MISSING))
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }
}

#[cfg(feature = "ofdpa-link")]
impl ControlPlane for RpcClient {
    fn flow_add(&mut self, entry: &FlowEntry) -> OfdpaResult<()> {
        entry.validate()?;
        let mut raw = ffi::RawFlowEntry::zeroed(entry.table_id());
        // Safety: raw is a valid, exclusively borrowed ofdpaFlowEntry_t.
        unsafe { ffi::ofdpaFlowEntryInit(entry.table_id().as_raw(), &mut raw) }.to_result()?;
        raw.fill(entry);
        // Safety: as above.
        unsafe { ffi::ofdpaFlowAdd(&mut raw) }.to_result()
    }

    fn group_add(&mut self, group: &GroupEntry) -> OfdpaResult<GroupId> {
        group.validate()?;
        let mut raw = ffi::RawGroupEntry::from(group);
        // Safety: raw is a valid, exclusively borrowed ofdpaGroupEntry_t.
        unsafe { ffi::ofdpaGroupAdd(&mut raw) }.to_result()?;
        Ok(GroupId::from_raw(raw.group_id))
    }

    fn group_bucket_add(&mut self, bucket: &L2InterfaceBucket) -> OfdpaResult<()> {
        bucket.validate()?;
        let mut raw = ffi::RawGroupBucketEntry::from(bucket);
        // Safety: raw is a valid, exclusively borrowed ofdpaGroupBucketEntry_t.
        unsafe { ffi::ofdpaGroupBucketEntryAdd(&mut raw) }.to_result()
    }
}

/// Stub implementation when the client library is not linked.
#[cfg(not(feature = "ofdpa-link"))]
impl ControlPlane for RpcClient {
    fn flow_add(&mut self, _entry: &FlowEntry) -> OfdpaResult<()> {
        Err(OfdpaError::session(TRANSPORT_MISSING))
    }

    fn group_add(&mut self, _group: &GroupEntry) -> OfdpaResult<GroupId> {
        Err(OfdpaError::session(TRANSPORT_MISSING))
    }

    fn group_bucket_add(&mut self, _bucket: &L2InterfaceBucket) -> OfdpaResult<()> {
        Err(OfdpaError::session(TRANSPORT_MISSING))
    }
}
