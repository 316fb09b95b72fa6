//! Random flow networks with cross-validated maximum flows.
//!
//! [`compute_round`] generates a small layered network between a source `A` and a sink
//! `T`, solves it with both Edmonds-Karp and Dinic on independent residual graphs,
//! times each solver and returns a [`GameRound`] holding the topology, both answers,
//! the timings and the per-arc flow of the canonical (Dinic) solution.
//!
//! ```
//! let round = flowround::compute_round(Some(7)).unwrap();
//! assert!(round.algorithms_agree());
//! assert!(round.is_correct_guess(round.correct_flow()));
//! ```

pub mod error;
pub mod flow;
pub mod harness;
pub mod network;

pub use error::{Error, Result};
pub use flow::{Dinic, EdmondsKarp, FlowOutcome, MaxFlowSolver, ResidualGraph};
pub use harness::{
    compute_round, compute_round_with, AlgorithmDisagreement, FlowBenchmarkHarness, GameRound,
};
pub use network::{GeneratorPolicy, NetworkGenerator, NodeId, Topology};
