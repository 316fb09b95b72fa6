use log::{debug, trace};
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::flow::{total_flow, FlowOutcome, MaxFlowSolver, ResidualEdge, ResidualGraph};

/// Edmonds-Karp: saturate shortest augmenting paths, found by breadth-first search,
/// until the sink is unreachable in the residual graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdmondsKarp;

impl MaxFlowSolver for EdmondsKarp {
    fn name(&self) -> &'static str {
        "edmonds-karp"
    }

    fn max_flow(
        &self,
        graph: &mut ResidualGraph,
        source: usize,
        sink: usize,
    ) -> Result<FlowOutcome> {
        graph.check_vertex(source)?;
        graph.check_vertex(sink)?;
        if source == sink {
            return Ok(FlowOutcome::default());
        }

        let mut outcome = FlowOutcome::default();

        // While there exists an augmenting path
        while let Some(path) = find_augmenting_path(graph, source, sink) {
            let bottleneck = path
                .iter()
                .map(|&edge| graph.residual(edge))
                .min()
                .unwrap_or(0);
            if bottleneck == 0 {
                return Err(Error::InvariantViolation(format!(
                    "augmenting path {:?} has no residual capacity",
                    path
                )));
            }

            for &edge in &path {
                graph.push(edge, bottleneck)?;
            }
            trace!(
                "augmented {} along {} arcs into {}",
                bottleneck,
                path.len(),
                sink
            );

            outcome.pushed += bottleneck;
            outcome.augmentations += 1;
        }

        outcome.phases = outcome.augmentations;
        outcome.value = total_flow(graph, source)?;
        debug!(
            "edmonds-karp finished: flow {} after {} augmentations",
            outcome.value, outcome.augmentations
        );
        Ok(outcome)
    }
}

/// Breadth-first search for a shortest source to sink path with positive residual
/// capacity. Returns the residual edges of the path, source side first.
fn find_augmenting_path(
    graph: &ResidualGraph,
    source: usize,
    sink: usize,
) -> Option<Vec<ResidualEdge>> {
    let n = graph.node_count();
    let mut visited = vec![false; n];
    // Residual edge used to first reach each node.
    let mut predecessor: Vec<Option<ResidualEdge>> = vec![None; n];
    let mut queue = VecDeque::new();

    visited[source] = true;
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        for edge in graph.residual_edges(u) {
            let v = edge.to;
            if !visited[v] && graph.residual(edge) > 0 {
                visited[v] = true;
                predecessor[v] = Some(edge);
                if v == sink {
                    return Some(construct_path(graph, &predecessor, source, sink));
                }
                queue.push_back(v);
            }
        }
    }
    None
}

fn construct_path(
    graph: &ResidualGraph,
    predecessor: &[Option<ResidualEdge>],
    source: usize,
    sink: usize,
) -> Vec<ResidualEdge> {
    let mut path = Vec::new();
    let mut curr = sink;
    while let Some(edge) = predecessor[curr] {
        path.push(edge);
        curr = graph.tail(edge);
    }
    debug_assert_eq!(curr, source);
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, arcs: &[(usize, usize, u64)]) -> ResidualGraph {
        let mut graph = ResidualGraph::new(n);
        for &(u, v, c) in arcs {
            graph.add_arc(u, v, c).unwrap();
        }
        graph
    }

    #[test]
    fn test_edmond_karp_simple_graph() {
        let mut g = graph(
            6,
            &[
                (0, 1, 16),
                (0, 2, 13),
                (1, 3, 12),
                (2, 1, 4),
                (2, 4, 14),
                (3, 2, 9),
                (3, 5, 20),
                (4, 3, 7),
                (4, 5, 4),
            ],
        );
        let outcome = EdmondsKarp.max_flow(&mut g, 0, 5).unwrap();
        assert_eq!(outcome.value, 23);
        assert_eq!(outcome.pushed, 23);
    }

    #[test]
    fn test_edmond_karp_no_path() {
        let mut g = graph(4, &[(0, 1, 10), (2, 3, 10)]);
        let outcome = EdmondsKarp.max_flow(&mut g, 0, 3).unwrap();
        assert_eq!(outcome, FlowOutcome::default());
    }

    #[test]
    fn test_edmond_karp_invalid_vertex() {
        let mut g = graph(2, &[(0, 1, 10)]);
        let result = EdmondsKarp.max_flow(&mut g, 0, 2);
        assert!(matches!(result.unwrap_err(), Error::InvalidVertex(2)));
    }

    #[test]
    fn test_edmond_karp_uses_shortest_path_first() {
        // A long path and a direct two-hop path share the final arc into the sink.
        let mut g = graph(5, &[(0, 1, 5), (1, 2, 5), (2, 3, 5), (0, 3, 5), (3, 4, 5)]);
        let outcome = EdmondsKarp.max_flow(&mut g, 0, 4).unwrap();
        assert_eq!(outcome.value, 5);
        assert_eq!(outcome.augmentations, 1);
        assert_eq!(g.flow(0, 3), Some(5));
        assert_eq!(g.flow(0, 1), Some(0));
    }

    #[test]
    fn test_edmond_karp_backward_flow() {
        // The first shortest path 0-1-3-6 takes 1 -> 3, which the second path has to
        // cancel by walking 3 -> 1 backwards.
        let mut g = graph(
            7,
            &[
                (0, 1, 1),
                (0, 2, 1),
                (1, 3, 1),
                (2, 3, 1),
                (3, 6, 1),
                (1, 4, 1),
                (4, 5, 1),
                (5, 6, 1),
            ],
        );
        let outcome = EdmondsKarp.max_flow(&mut g, 0, 6).unwrap();
        assert_eq!(outcome.value, 2);
        assert_eq!(outcome.augmentations, 2);
        assert_eq!(g.flow(1, 3), Some(0));
        assert_eq!(g.flow(2, 3), Some(1));
    }

    #[test]
    fn test_augmenting_path_follows_predecessor_arcs() {
        // After 0-1-2-3 is saturated the only path to 3 cancels flow on 1 -> 2.
        let mut g = graph(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (0, 2, 1), (1, 3, 1)]);
        g.augment(0, 1, 1).unwrap();
        g.augment(1, 2, 1).unwrap();
        g.augment(2, 3, 1).unwrap();

        let path = find_augmenting_path(&g, 0, 3).unwrap();
        let hops: Vec<(usize, usize, bool)> = path
            .iter()
            .map(|&edge| (g.tail(edge), edge.to, edge.forward))
            .collect();
        assert_eq!(hops, vec![(0, 2, true), (2, 1, false), (1, 3, true)]);
        assert!(path.iter().all(|&edge| g.residual(edge) == 1));
    }
}
