//! Maximum flow solvers over a shared [`ResidualGraph`] representation.
//!
//! The two solvers share only the residual graph API and can check each other.

pub mod dinic;
pub mod edmond_karp;
pub mod residual;


pub use dinic::Dinic;
pub use edmond_karp::EdmondsKarp;
pub use residual::{ArcState, ResidualEdge, ResidualGraph};

use crate::error::{Error, Result};

/// What a single solver run pushed through the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowOutcome {
    /// Total source to sink flow carried by the graph once the run ends
    pub value: u64,
    /// Part of `value` pushed by this run
    pub pushed: u64,
    /// Number of augmenting paths used
    pub augmentations: usize,
    /// Breadth-first searches that reached the sink
    pub phases: usize,
}

/// A maximum flow algorithm that works in place on a residual graph.
pub trait MaxFlowSolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pushes flow from `source` to `sink` until no augmenting path remains.
    ///
    /// On an already maximal graph this performs no augmentations and reports the
    /// flow the graph already carries.
    fn max_flow(&self, graph: &mut ResidualGraph, source: usize, sink: usize)
        -> Result<FlowOutcome>;
}

/// Net flow out of `source`, which the solvers report as the flow value.
pub(crate) fn total_flow(graph: &ResidualGraph, source: usize) -> Result<u64> {
    let net = graph.net_outflow(source);
    u64::try_from(net).map_err(|_| {
        Error::InvariantViolation(format!("source {} has net outflow {}", source, net))
    })
}
