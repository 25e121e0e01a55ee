//! ofdpa-snake - OF-DPA patch panel for snake tests
//!
//! Pairs up a contiguous range of switch ports and programs the OF-DPA
//! pipeline so that each pair behaves like a patch cable: traffic entering
//! one port leaves through the other, isolated per pair by VLAN.
//!
//! - [`planner`]: validates the request and computes the pairs
//! - [`builder`]: derives and installs the table entries for a pair
//! - [`runner`]: wires a whole plan over one control plane session
//! - [`config`]: defaults, YAML file and command-line overrides
//!
//! # Example
//!
//! ```
//! use ofdpa::SoftSwitch;
//! use ofdpa_snake::{SnakeRunner, TopologyPlanner};
//!
//! let mut sw = SoftSwitch::new();
//! let report = SnakeRunner::new(TopologyPlanner::new(), &mut sw).run(1, 4, 10)?;
//! assert_eq!(report.pairs.len(), 2);
//! # Ok::<(), ofdpa_snake::SnakeError>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod planner;
pub mod runner;
pub mod types;

pub use builder::{
    classification_entries, ForwardingEntries, InstallCounts, PairEntries, PipelineBuilder,
};
pub use config::{ConfigOverrides, SnakeConfig};
pub use error::{ForwardingStage, SnakeError, SnakeResult};
pub use planner::{plan, SnakePlan, TopologyPlanner};
pub use runner::{derive_entries, SnakeRunner, WireReport};
pub use types::{PortId, PortPair, VlanTag};
