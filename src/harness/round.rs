use serde::Serialize;

use crate::network::NodeId;

/// A capacitated arc as handed to the game layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub capacity: u64,
}

/// Converged flow on one arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArcFlow {
    pub source: NodeId,
    pub target: NodeId,
    pub flow: u64,
}

/// The two solvers reported different maximum flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmDisagreement {
    /// Value from the cross-checking (augmenting path) solver
    pub reference: u64,
    /// Value from the canonical (blocking flow) solver, used for scoring
    pub canonical: u64,
}

/// Ground truth and timings for one generated network.
///
/// The `ek_*` fields hold the reference solver's result and the `dinic_*` fields the
/// canonical solver's. `correct_flow` and `flow_assignment` always come from the
/// canonical solver, even when the two disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRound {
    pub(crate) seed: Option<u64>,
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) edges: Vec<EdgeRecord>,
    pub(crate) correct_flow: u64,
    pub(crate) ek_flow: u64,
    pub(crate) dinic_flow: u64,
    pub(crate) ek_time_ms: f64,
    pub(crate) dinic_time_ms: f64,
    pub(crate) algorithms_agree: bool,
    pub(crate) flow_assignment: Vec<ArcFlow>,
}

impl GameRound {
    /// Seed the network was generated from, if it came from the generator.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn correct_flow(&self) -> u64 {
        self.correct_flow
    }

    pub fn ek_flow(&self) -> u64 {
        self.ek_flow
    }

    pub fn dinic_flow(&self) -> u64 {
        self.dinic_flow
    }

    pub fn ek_time_ms(&self) -> f64 {
        self.ek_time_ms
    }

    pub fn dinic_time_ms(&self) -> f64 {
        self.dinic_time_ms
    }

    pub fn algorithms_agree(&self) -> bool {
        self.algorithms_agree
    }

    /// Per-arc flow in arc order.
    pub fn flow_assignment(&self) -> &[ArcFlow] {
        &self.flow_assignment
    }

    /// Flow on the arc `source -> target`, or `None` if there is no such arc.
    pub fn flow(&self, source: NodeId, target: NodeId) -> Option<u64> {
        self.flow_assignment
            .iter()
            .find(|arc| arc.source == source && arc.target == target)
            .map(|arc| arc.flow)
    }

    /// Arcs that carry flow, for drawing the solution.
    pub fn positive_flows(&self) -> impl Iterator<Item = &ArcFlow> {
        self.flow_assignment.iter().filter(|arc| arc.flow > 0)
    }

    pub fn disagreement(&self) -> Option<AlgorithmDisagreement> {
        (!self.algorithms_agree).then_some(AlgorithmDisagreement {
            reference: self.ek_flow,
            canonical: self.dinic_flow,
        })
    }

    pub fn is_correct_guess(&self, guess: u64) -> bool {
        guess == self.correct_flow
    }

    pub(crate) fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
