use log::{debug, trace};
use std::cmp::min;
use std::collections::VecDeque;

use crate::error::Result;
use crate::flow::{total_flow, FlowOutcome, MaxFlowSolver, ResidualGraph};

/// Dinic's algorithm: each phase builds a BFS level graph and saturates it with a
/// blocking flow found by depth-first search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dinic;

impl MaxFlowSolver for Dinic {
    fn name(&self) -> &'static str {
        "dinic"
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

        let n = graph.node_count();
        let mut outcome = FlowOutcome::default();
        let mut level = vec![None; n];
        let mut start = vec![0; n];

        while bfs(graph, source, sink, &mut level) {
            outcome.phases += 1;
            start.fill(0);

            let mut phase_flow = 0;
            loop {
                let flow = dfs(graph, source, sink, &level, u64::MAX, &mut start)?;
                if flow == 0 {
                    break;
                }
                phase_flow += flow;
                outcome.augmentations += 1;
            }
            trace!(
                "phase {}: blocking flow {} with sink at level {:?}",
                outcome.phases,
                phase_flow,
                level[sink]
            );
            outcome.pushed += phase_flow;
        }

        outcome.value = total_flow(graph, source)?;
        debug!(
            "dinic finished: flow {} after {} phases and {} augmentations",
            outcome.value, outcome.phases, outcome.augmentations
        );
        Ok(outcome)
    }
}

/// Labels every node reachable over positive residual edges with its BFS distance from
/// `s`. Returns whether `t` got a level.
fn bfs(graph: &ResidualGraph, s: usize, t: usize, level: &mut [Option<usize>]) -> bool {
    level.fill(None);
    level[s] = Some(0);
    let mut queue = VecDeque::new();
    queue.push_back(s);

    while let Some(u) = queue.pop_front() {
        let next = level[u].map(|l| l + 1);
        for edge in graph.residual_edges(u) {
            if level[edge.to].is_none() && graph.residual(edge) > 0 {
                level[edge.to] = next;
                queue.push_back(edge.to);
            }
        }
    }
    level[t].is_some()
}

/// Finds one admissible path from `u` to `t` carrying at most `flow` and pushes along
/// it. `start[u]` is the current-arc pointer: edges before it are exhausted for this
/// phase.
fn dfs(
    graph: &mut ResidualGraph,
    u: usize,
    t: usize,
    level: &[Option<usize>],
    flow: u64,
    start: &mut [usize],
) -> Result<u64> {
    if u == t {
        return Ok(flow);
    }
    while let Some(edge) = graph.edge_at(u, start[u]) {
        let capacity = graph.residual(edge);
        let admissible = match (level[u], level[edge.to]) {
            (Some(lu), Some(lv)) => lv == lu + 1,
            _ => false,
        };

        if capacity > 0 && admissible {
            let pushed = dfs(graph, edge.to, t, level, min(flow, capacity), start)?;
            if pushed > 0 {
                graph.push(edge, pushed)?;
                return Ok(pushed);
            }
        }
        start[u] += 1;
    }
    Ok(0)
}
