//! Safe Rust bindings for the OF-DPA client API.
//!
//! OF-DPA (OpenFlow Data Plane Abstraction) exposes a switch ASIC's
//! forwarding pipeline as a fixed set of OpenFlow-style flow tables and
//! groups. This crate models the parts of that API used to wire a patch
//! panel and hides the bit-packed integer encodings behind typed values.
//!
//! # Architecture
//!
//! - [`types`]: group ids, VLAN match encodings, table ids
//! - [`error`]: return codes and the [`OfdpaError`] type
//! - [`api`]: flow and group entries plus the [`ControlPlane`] trait
//! - [`soft`]: [`SoftSwitch`], an in-memory control plane
//! - [`rpc`]: [`RpcClient`], the session to the on-switch agent
//!
//! # Features
//!
//! - `ofdpa-link`: link against the vendor OF-DPA RPC client library. Without
//!   it, [`RpcClient::initialize`] always fails with a session error.
//!
//! # Example
//!
//! ```
//! use ofdpa::{ControlPlane, GroupEntry, L2InterfaceBucket, SoftSwitch};
//!
//! let mut sw = SoftSwitch::new();
//! let group = GroupEntry::l2_interface(10, 2);
//! let id = sw.group_add(&group)?;
//! sw.group_bucket_add(&L2InterfaceBucket::new(&group, 2, false))?;
//! assert!(sw.bucket(id).is_some());
//! # Ok::<(), ofdpa::OfdpaError>(())
//! ```

pub mod api;
pub mod error;
#[cfg(feature = "ofdpa-link")]
mod ffi;
pub mod rpc;
pub mod soft;
pub mod types;

pub use api::{
    ControlPlane, FlowEntry, GroupEntry, L2InterfaceBucket, PolicyAclFlowEntry, VlanFlowEntry,
};
pub use error::{OfdpaError, OfdpaResult, OfdpaStatus, OfdpaStatusExt};
pub use rpc::{RpcClient, DEFAULT_CLIENT_NAME};
pub use soft::{SoftOp, SoftSwitch};
pub use types::{FlowTableId, GroupId, GroupType, PortNo, VlanMatch, PORT_NO_MAX};
