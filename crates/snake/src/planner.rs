//! Topology planner: validates a port range and splits it into pairs.

use ofdpa::PORT_NO_MAX;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{SnakeError, SnakeResult};
use crate::types::{PortId, PortPair, VlanTag};

/// Lowest port number the switch exposes.
pub const MIN_PORT: PortId = 1;

/// Highest port number a snake can use, bounded by the group id encoding.
pub const MAX_PORT: PortId = PORT_NO_MAX;

/// A validated snake: the VLAN handling and the pairs to wire, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnakePlan {
    pub vlan: VlanTag,
    pub pairs: Vec<PortPair>,
}

impl SnakePlan {
    pub fn port_count(&self) -> usize {
        self.pairs.len() * 2
    }
}

/// Validates snake requests and computes port pairs.
///
/// Holds no state between calls beyond the optional upper port bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyPlanner {
    max_port: Option<PortId>,
}

impl TopologyPlanner {
    /// Creates a planner bounded only by [`MAX_PORT`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects ranges that end above `max_port` (never above [`MAX_PORT`]).
    pub fn with_max_port(mut self, max_port: PortId) -> Self {
        self.max_port = Some(max_port);
        self
    }

    pub fn max_port(&self) -> Option<PortId> {
        self.max_port
    }

    /// Validates the request and returns the pairs to wire.
    ///
    /// Every check runs before any pair is computed:
    ///
    /// 1. `end_port` must be greater than `start_port`.
    /// 2. `start_port..=end_port` must hold an even number of ports.
    /// 3. `vlan_id` must be 0-4095 (0 means untagged).
    /// 4. Both ends must lie in `MIN_PORT..=MAX_PORT` and not above the
    ///    configured `max_port`.
    ///
    /// Ports pair up in order: the first two, then the next two, and so on.
    #[instrument(skip(self))]
    pub fn plan(
        &self,
        start_port: PortId,
        end_port: PortId,
        vlan_id: u32,
    ) -> SnakeResult<SnakePlan> {
        if end_port <= start_port {
            return Err(SnakeError::InvalidRange {
                start: start_port,
                end: end_port,
            });
        }
        if (end_port - start_port) % 2 == 0 {
            return Err(SnakeError::OddPortCount {
                start: start_port,
                end: end_port,
                count: end_port - start_port + 1,
            });
        }
        let vlan = VlanTag::from_raw(vlan_id)?;
        self.check_port(start_port)?;
        self.check_port(end_port)?;

        let mut pairs = Vec::with_capacity(((end_port - start_port + 1) / 2) as usize);
        let mut second_of_pair = false;
        for port in start_port..end_port {
            if second_of_pair {
                second_of_pair = false;
                continue;
            }
            second_of_pair = true;
            pairs.push(PortPair::starting_at(port));
        }

        debug!("Planned {} pairs on {}", pairs.len(), vlan);
        Ok(SnakePlan { vlan, pairs })
    }

    fn check_port(&self, port: PortId) -> SnakeResult<()> {
        let max = self.max_port.map_or(MAX_PORT, |m| m.min(MAX_PORT));
        if port < MIN_PORT || port > max {
            return Err(SnakeError::PortOutOfRange {
                port,
                min: MIN_PORT,
                max,
            });
        }
        Ok(())
    }
}

/// Plans a snake bounded only by [`MAX_PORT`].
pub fn plan(start_port: PortId, end_port: PortId, vlan_id: u32) -> SnakeResult<SnakePlan> {
    TopologyPlanner::new().plan(start_port, end_port, vlan_id)
}
