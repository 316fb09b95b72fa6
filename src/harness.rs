//! Cross-validated max-flow rounds.
//!
//! A round solves one topology twice, with a reference solver and a canonical solver,
//! each on its own residual graph. Both converged graphs are checked for capacity and
//! conservation, the two values are compared, and the canonical solver's answer is
//! what the round reports for scoring.

pub mod round;

pub use round::{AlgorithmDisagreement, ArcFlow, EdgeRecord, GameRound};

use log::{error, info, warn};
use rand::Rng;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::flow::{Dinic, EdmondsKarp, FlowOutcome, MaxFlowSolver, ResidualGraph};
use crate::network::{NetworkGenerator, NodeId, Topology};

/// Generates a network and solves it with both algorithms.
///
/// Without a seed one is drawn from OS entropy and recorded in the round, so every
/// round can be replayed.
pub fn compute_round(seed: Option<u64>) -> Result<GameRound> {
    compute_round_with(seed, &FlowBenchmarkHarness::new())
}

/// [`compute_round`] with a custom harness.
pub fn compute_round_with<R, C>(
    seed: Option<u64>,
    harness: &FlowBenchmarkHarness<R, C>,
) -> Result<GameRound>
where
    R: MaxFlowSolver,
    C: MaxFlowSolver,
{
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    let topology = NetworkGenerator::with_seed(seed).generate()?;
    Ok(harness.run(&topology)?.with_seed(seed))
}

/// Runs a reference and a canonical solver on independent copies of a topology.
#[derive(Debug, Clone, Default)]
pub struct FlowBenchmarkHarness<R = EdmondsKarp, C = Dinic> {
    reference: R,
    canonical: C,
    parallel: bool,
}

impl FlowBenchmarkHarness {
    /// Edmonds-Karp as reference, Dinic as canonical, run one after the other.
    pub fn new() -> Self {
        Self::default()
    }
}

struct TimedRun {
    outcome: FlowOutcome,
    graph: ResidualGraph,
    elapsed_ms: f64,
}

impl<R, C> FlowBenchmarkHarness<R, C>
where
    R: MaxFlowSolver,
    C: MaxFlowSolver,
{
    pub fn with_solvers(reference: R, canonical: C) -> Self {
        Self {
            reference,
            canonical,
            parallel: false,
        }
    }

    /// Run the two solvers on separate rayon tasks instead of back to back.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn run(&self, topology: &Topology) -> Result<GameRound> {
        let source = topology.source();
        let sink = topology.sink();
        let reference_graph = ResidualGraph::from_topology(topology)?;
        let canonical_graph = ResidualGraph::from_topology(topology)?;

        let (reference, canonical) = if self.parallel {
            rayon::join(
                || timed(&self.reference, reference_graph, source, sink),
                || timed(&self.canonical, canonical_graph, source, sink),
            )
        } else {
            (
                timed(&self.reference, reference_graph, source, sink),
                timed(&self.canonical, canonical_graph, source, sink),
            )
        };
        let reference = reference?;
        let canonical = canonical?;

        verify(self.reference.name(), &reference, source, sink)?;
        verify(self.canonical.name(), &canonical, source, sink)?;

        let algorithms_agree = reference.outcome.value == canonical.outcome.value;
        if !algorithms_agree {
            warn!(
                "{} and {} disagree: {} vs {}; scoring with {}",
                self.reference.name(),
                self.canonical.name(),
                reference.outcome.value,
                canonical.outcome.value,
                self.canonical.name()
            );
        }
        info!(
            "round solved: max flow {} ({} {:.3} ms, {} {:.3} ms)",
            canonical.outcome.value,
            self.reference.name(),
            reference.elapsed_ms,
            self.canonical.name(),
            canonical.elapsed_ms
        );

        let edges = topology
            .arcs()
            .iter()
            .map(|arc| {
                Ok(EdgeRecord {
                    source: node(topology, arc.from)?,
                    target: node(topology, arc.to)?,
                    capacity: arc.capacity,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let flow_assignment = canonical
            .graph
            .arcs()
            .iter()
            .map(|arc| {
                Ok(ArcFlow {
                    source: node(topology, arc.from)?,
                    target: node(topology, arc.to)?,
                    flow: arc.flow,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GameRound {
            seed: None,
            nodes: topology.nodes().to_vec(),
            edges,
            correct_flow: canonical.outcome.value,
            ek_flow: reference.outcome.value,
            dinic_flow: canonical.outcome.value,
            ek_time_ms: reference.elapsed_ms,
            dinic_time_ms: canonical.elapsed_ms,
            algorithms_agree,
            flow_assignment,
        })
    }
}

fn timed<S: MaxFlowSolver>(
    solver: &S,
    mut graph: ResidualGraph,
    source: usize,
    sink: usize,
) -> Result<TimedRun> {
    let start = Instant::now();
    let outcome = solver.max_flow(&mut graph, source, sink);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(outcome) => Ok(TimedRun {
            outcome,
            graph,
            elapsed_ms,
        }),
        Err(err) => {
            error!("{} aborted: {}", solver.name(), err);
            Err(err)
        }
    }
}

fn verify(name: &str, run: &TimedRun, source: usize, sink: usize) -> Result<()> {
    let checked = run
        .graph
        .check_capacity()
        .and_then(|_| run.graph.check_conservation(source, sink));
    if let Err(err) = checked {
        error!("{} left an invalid flow: {}", name, err);
        return Err(err);
    }
    Ok(())
}

fn node(topology: &Topology, index: usize) -> Result<NodeId> {
    topology.node(index).ok_or(Error::InvalidVertex(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::ResidualEdge;

    /// Greedy depth-first augmentation that only follows forward arcs, so it can never
    /// undo a bad early choice.
    #[derive(Debug, Default)]
    struct ForwardOnly;

    impl ForwardOnly {
        fn path(
            graph: &ResidualGraph,
            u: usize,
            sink: usize,
            seen: &mut [bool],
        ) -> Option<Vec<ResidualEdge>> {
            if u == sink {
                return Some(Vec::new());
            }
            seen[u] = true;
            for edge in graph.residual_edges(u) {
                if edge.forward && !seen[edge.to] && graph.residual(edge) > 0 {
                    if let Some(mut rest) = Self::path(graph, edge.to, sink, seen) {
                        rest.insert(0, edge);
                        return Some(rest);
                    }
                }
            }
            None
        }
    }

    impl MaxFlowSolver for ForwardOnly {
        fn name(&self) -> &'static str {
            "forward-only"
        }

        fn max_flow(
            &self,
            graph: &mut ResidualGraph,
            source: usize,
            sink: usize,
        ) -> Result<FlowOutcome> {
            let mut outcome = FlowOutcome::default();
            loop {
                let mut seen = vec![false; graph.node_count()];
                let Some(path) = Self::path(graph, source, sink, &mut seen) else {
                    break;
                };
                let bottleneck = path.iter().map(|&e| graph.residual(e)).min().unwrap_or(0);
                for &edge in &path {
                    graph.push(edge, bottleneck)?;
                }
                outcome.value += bottleneck;
                outcome.pushed += bottleneck;
                outcome.augmentations += 1;
            }
            Ok(outcome)
        }
    }

    /// Claims one unit of flow without moving any.
    #[derive(Debug, Default)]
    struct Inflated;

    impl MaxFlowSolver for Inflated {
        fn name(&self) -> &'static str {
            "inflated"
        }

        fn max_flow(&self, graph: &mut ResidualGraph, _: usize, _: usize) -> Result<FlowOutcome> {
            let arc = graph.arcs()[0];
            graph.augment(arc.from, arc.to, 1)?;
            Ok(FlowOutcome {
                value: 1,
                pushed: 1,
                augmentations: 1,
                phases: 1,
            })
        }
    }

    fn diamond() -> Topology {
        Topology::from_arcs(&[('A', 'B', 10), ('A', 'C', 10), ('B', 'T', 5), ('C', 'T', 15)])
            .unwrap()
    }

    /// Greedy forward search takes A-B-C-T first and then cannot reroute.
    fn trap() -> Topology {
        Topology::from_arcs(&[
            ('A', 'B', 1),
            ('A', 'C', 1),
            ('B', 'C', 1),
            ('B', 'T', 1),
            ('C', 'T', 1),
        ])
        .unwrap()
    }

    fn letter(c: char) -> NodeId {
        NodeId::new(c).unwrap()
    }

    #[test]
    fn test_diamond_round() {
        let round = FlowBenchmarkHarness::new().run(&diamond()).unwrap();
        assert_eq!(round.correct_flow(), 15);
        assert_eq!(round.ek_flow(), 15);
        assert_eq!(round.dinic_flow(), 15);
        assert!(round.algorithms_agree());
        assert_eq!(round.disagreement(), None);
        assert_eq!(round.seed(), None);
        assert_eq!(round.flow(letter('B'), NodeId::SINK), Some(5));
        assert_eq!(round.flow(letter('C'), NodeId::SINK), Some(10));
        assert_eq!(round.flow(NodeId::SINK, letter('C')), None);
        assert!(round.ek_time_ms() >= 0.0);
        assert!(round.dinic_time_ms() >= 0.0);
        assert!(round.is_correct_guess(15));
        assert!(!round.is_correct_guess(20));
    }

    #[test]
    fn test_detects_disagreement() {
        let topology = trap();
        let harness = FlowBenchmarkHarness::with_solvers(ForwardOnly, Dinic);
        let round = harness.run(&topology).unwrap();

        assert!(!round.algorithms_agree());
        assert_eq!(round.ek_flow(), 1);
        assert_eq!(round.dinic_flow(), 2);
        assert_eq!(round.correct_flow(), 2);
        assert_eq!(
            round.disagreement(),
            Some(AlgorithmDisagreement {
                reference: 1,
                canonical: 2
            })
        );

        // The canonical solver's flow is what gets reported.
        assert_eq!(round.flow(letter('B'), letter('C')), Some(0));
        assert_eq!(round.positive_flows().count(), 4);
    }

    #[test]
    fn test_canonical_solver_drives_scoring() {
        let harness = FlowBenchmarkHarness::with_solvers(Dinic, ForwardOnly);
        let round = harness.run(&trap()).unwrap();
        assert!(!round.algorithms_agree());
        assert_eq!(round.correct_flow(), 1);
        assert_eq!(round.flow(letter('B'), letter('C')), Some(1));
    }

    #[test]
    fn test_invalid_flow_is_an_error() {
        let harness = FlowBenchmarkHarness::with_solvers(EdmondsKarp, Inflated);
        let result = harness.run(&diamond());
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        for seed in 0..20 {
            let topology = NetworkGenerator::with_seed(seed).generate().unwrap();
            let sequential = FlowBenchmarkHarness::new().run(&topology).unwrap();
            let parallel = FlowBenchmarkHarness::new()
                .parallel(true)
                .run(&topology)
                .unwrap();
            assert_eq!(sequential.correct_flow(), parallel.correct_flow());
            assert_eq!(sequential.flow_assignment(), parallel.flow_assignment());
            assert!(parallel.algorithms_agree());
        }
    }

    #[test]
    fn test_compute_round_is_deterministic() {
        let first = compute_round(Some(2024)).unwrap();
        let second = compute_round(Some(2024)).unwrap();
        assert_eq!(first.seed(), Some(2024));
        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.edges(), second.edges());
        assert_eq!(first.correct_flow(), second.correct_flow());
        assert_eq!(first.flow_assignment(), second.flow_assignment());
        assert!(first.algorithms_agree());
    }

    #[test]
    fn test_compute_round_records_drawn_seed() {
        let round = compute_round(None).unwrap();
        let seed = round.seed().unwrap();
        let replay = compute_round(Some(seed)).unwrap();
        assert_eq!(round.edges(), replay.edges());
        assert_eq!(round.correct_flow(), replay.correct_flow());
    }

    #[test]
    fn test_round_matches_topology() {
        let topology = NetworkGenerator::with_seed(99).generate().unwrap();
        let round = FlowBenchmarkHarness::new().run(&topology).unwrap();
        assert_eq!(round.nodes(), topology.nodes());
        assert_eq!(round.edges().len(), topology.arcs().len());
        assert_eq!(round.flow_assignment().len(), topology.arcs().len());
        for (edge, arc) in round.edges().iter().zip(round.flow_assignment()) {
            assert_eq!((edge.source, edge.target), (arc.source, arc.target));
            assert!(arc.flow <= edge.capacity);
        }
        let into_sink: u64 = round
            .flow_assignment()
            .iter()
            .filter(|arc| arc.target == NodeId::SINK)
            .map(|arc| arc.flow)
            .sum();
        assert_eq!(into_sink, round.correct_flow());
    }

    #[test]
    fn test_round_json_shape() {
        let round = FlowBenchmarkHarness::new().run(&diamond()).unwrap();
        let json = serde_json::to_value(&round).unwrap();
        assert_eq!(json["nodes"], serde_json::json!(["A", "B", "C", "T"]));
        assert_eq!(
            json["edges"][0],
            serde_json::json!({"source": "A", "target": "B", "capacity": 10})
        );
        assert_eq!(json["correct_flow"], 15);
        assert_eq!(json["algorithms_agree"], true);
        assert_eq!(
            json["flow_assignment"][2],
            serde_json::json!({"source": "B", "target": "T", "flow": 5})
        );
        assert!(json["ek_time_ms"].is_f64());
        assert!(json["seed"].is_null());
    }
}
