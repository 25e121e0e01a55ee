//! SnakeRunner - plans a snake and wires every pair in order

use ofdpa::ControlPlane;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::builder::{InstallCounts, PairEntries, PipelineBuilder};
use crate::error::SnakeResult;
use crate::planner::{SnakePlan, TopologyPlanner};
use crate::types::{PortId, PortPair, VlanTag};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireReport {
    pub vlan: VlanTag,
    pub pairs: Vec<PortPair>,
    pub installed: InstallCounts,
}

/// Composes the planner and the builder over one control plane session.
///
/// Pairs are wired strictly one after another. The first failure ends the
/// run; pairs wired before it stay on the switch.
pub struct SnakeRunner<C: ControlPlane> {
    planner: TopologyPlanner,
    builder: PipelineBuilder<C>,
}

impl<C: ControlPlane> SnakeRunner<C> {
    pub fn new(planner: TopologyPlanner, plane: C) -> Self {
        Self {
            planner,
            builder: PipelineBuilder::new(plane),
        }
    }

    pub fn into_plane(self) -> C {
        self.builder.into_plane()
    }

    /// Validates the request and wires every pair.
    #[instrument(skip(self))]
    pub fn run(
        &mut self,
        start_port: PortId,
        end_port: PortId,
        vlan_id: u32,
    ) -> SnakeResult<WireReport> {
        let plan = self.planner.plan(start_port, end_port, vlan_id)?;
        self.wire_plan(&plan)
    }

    /// Wires an already validated plan.
    pub fn wire_plan(&mut self, plan: &SnakePlan) -> SnakeResult<WireReport> {
        info!(
            "Wiring {} ports as {} pairs on {}",
            plan.port_count(),
            plan.pairs.len(),
            plan.vlan
        );

        let mut installed = InstallCounts::default();
        for (done, pair) in plan.pairs.iter().enumerate() {
            match self.builder.wire(*pair, plan.vlan) {
                Ok(counts) => installed.add(counts),
                Err(e) => {
                    error!(
                        "Stopped at pair {} after wiring {} of {} pairs: {}",
                        pair,
                        done,
                        plan.pairs.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        info!(
            "Snake complete: {} pairs, {} entries installed",
            plan.pairs.len(),
            installed.total()
        );
        Ok(WireReport {
            vlan: plan.vlan,
            pairs: plan.pairs.clone(),
            installed,
        })
    }
}

/// Derives every entry of a plan without installing anything.
pub fn derive_entries(plan: &SnakePlan) -> Vec<PairEntries> {
    plan.pairs
        .iter()
        .map(|&pair| PairEntries::derive(pair, plan.vlan))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnakeError;
    use ofdpa::{OfdpaStatus, SoftSwitch};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_run_counts() {
        let mut sw = SoftSwitch::new();
        let report = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
            .run(1, 4, 10)
            .unwrap();

        assert_eq!(report.pairs.len(), 2);
        assert_eq!(report.installed.vlan_flows, 4);
        assert_eq!(report.installed.total(), 4 + 4 * 3);
        assert_eq!(sw.flow_count(), 8);
    }

    #[test]
    fn test_validation_touches_nothing() {
        let mut sw = SoftSwitch::new();
        let err = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
            .run(1, 48, 4096)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(sw.calls(), 0);
    }

    #[test]
    fn test_stops_at_first_failure() {
        // One tagged pair takes 8 calls; fail the first call of pair 2.
        let mut sw = SoftSwitch::new().fail_call(9, OfdpaStatus::Full);
        let err = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
            .run(1, 6, 10)
            .unwrap_err();

        assert!(matches!(err, SnakeError::ClassificationInstall { port: 3, .. }));
        assert_eq!(sw.calls(), 9);
        assert_eq!(sw.group_count(), 2);
    }

    #[test]
    fn test_derive_entries_matches_install() {
        let plan = TopologyPlanner::new().plan(1, 4, 0).unwrap();
        let entries = derive_entries(&plan);
        let vlan_flows: usize = entries.iter().map(|e| e.classification.len()).sum();

        let mut sw = SoftSwitch::new();
        let report = SnakeRunner::new(TopologyPlanner::new(), &mut sw)
            .wire_plan(&plan)
            .unwrap();
        assert_eq!(report.installed.vlan_flows, vlan_flows);
    }

    #[test]
    fn test_owned_plane_returned() {
        let mut runner = SnakeRunner::new(TopologyPlanner::new(), SoftSwitch::new());
        runner.run(1, 2, 0).unwrap();
        let sw = runner.into_plane();
        assert_eq!(sw.flow_count(), 4 + 2);
        assert_eq!(sw.group_count(), 2);
    }
}
