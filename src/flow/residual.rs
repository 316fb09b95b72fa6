//! Residual view of a flow network.
//!
//! Every forward arc `(u, v)` stores its capacity and current flow. Its reverse
//! residual `(v, u)` is implicit: it can carry back up to `flow(u, v)` units. Nodes
//! and arcs are addressed by dense indices; each node keeps the ids of the arcs that
//! leave it and of the arcs that enter it, both in creation order.

use crate::error::{Error, Result};
use crate::network::Topology;

/// A forward arc together with the flow currently on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcState {
    pub from: usize,
    pub to: usize,
    pub capacity: u64,
    pub flow: u64,
}

/// One traversable residual edge out of a node.
///
/// `forward` edges follow arc `arc` from its tail to its head; the others walk it
/// backwards and cancel flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidualEdge {
    pub arc: usize,
    pub to: usize,
    pub forward: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualGraph {
    arcs: Vec<ArcState>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl ResidualGraph {
    pub fn new(n: usize) -> Self {
        ResidualGraph {
            arcs: Vec::new(),
            outgoing: vec![Vec::new(); n],
            incoming: vec![Vec::new(); n],
        }
    }

    /// Fresh zero-flow copy of `topology`.
    pub fn from_topology(topology: &Topology) -> Result<Self> {
        let mut graph = Self::new(topology.node_count());
        for arc in topology.arcs() {
            graph.add_arc(arc.from, arc.to, arc.capacity)?;
        }
        Ok(graph)
    }

    /// Adds a forward arc and returns its id.
    pub fn add_arc(&mut self, from: usize, to: usize, capacity: u64) -> Result<usize> {
        let n = self.node_count();
        if from >= n || to >= n {
            return Err(Error::InvalidArc {
                from,
                to,
                reason: "endpoint out of range",
            });
        }
        if from == to {
            return Err(Error::InvalidArc {
                from,
                to,
                reason: "self-loop",
            });
        }
        if let Some(edge) = self.find_edge(from, to) {
            let reason = if edge.forward {
                "duplicate arc"
            } else {
                "anti-parallel arc"
            };
            return Err(Error::InvalidArc { from, to, reason });
        }

        let id = self.arcs.len();
        self.arcs.push(ArcState {
            from,
            to,
            capacity,
            flow: 0,
        });
        self.outgoing[from].push(id);
        self.incoming[to].push(id);
        Ok(id)
    }

    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn arcs(&self) -> &[ArcState] {
        &self.arcs
    }

    pub fn check_vertex(&self, u: usize) -> Result<()> {
        if u < self.node_count() {
            Ok(())
        } else {
            Err(Error::InvalidVertex(u))
        }
    }

    /// All residual edges out of `u`: forward arcs first, then reverse residuals,
    /// each group in arc creation order. Saturated edges are included.
    pub fn residual_edges(&self, u: usize) -> impl Iterator<Item = ResidualEdge> + '_ {
        let forward = self.outgoing.get(u).into_iter().flatten().map(|&arc| ResidualEdge {
            arc,
            to: self.arcs[arc].to,
            forward: true,
        });
        let reverse = self.incoming.get(u).into_iter().flatten().map(|&arc| ResidualEdge {
            arc,
            to: self.arcs[arc].from,
            forward: false,
        });
        forward.chain(reverse)
    }

    /// Number of residual edges out of `u`.
    pub fn degree(&self, u: usize) -> usize {
        self.outgoing.get(u).map_or(0, Vec::len) + self.incoming.get(u).map_or(0, Vec::len)
    }

    /// The `i`-th entry of [`residual_edges`](Self::residual_edges) for `u`.
    pub fn edge_at(&self, u: usize, i: usize) -> Option<ResidualEdge> {
        let outgoing = self.outgoing.get(u)?;
        if let Some(&arc) = outgoing.get(i) {
            return Some(ResidualEdge {
                arc,
                to: self.arcs[arc].to,
                forward: true,
            });
        }
        let &arc = self.incoming.get(u)?.get(i - outgoing.len())?;
        Some(ResidualEdge {
            arc,
            to: self.arcs[arc].from,
            forward: false,
        })
    }

    fn find_edge(&self, u: usize, v: usize) -> Option<ResidualEdge> {
        self.residual_edges(u).find(|edge| edge.to == v)
    }

    /// Node the residual edge leaves from.
    pub fn tail(&self, edge: ResidualEdge) -> usize {
        let arc = &self.arcs[edge.arc];
        if edge.forward {
            arc.from
        } else {
            arc.to
        }
    }

    pub fn residual(&self, edge: ResidualEdge) -> u64 {
        let arc = &self.arcs[edge.arc];
        if edge.forward {
            arc.capacity.saturating_sub(arc.flow)
        } else {
            arc.flow
        }
    }

    /// Sends `amount` units along `edge`, raising the arc's flow for a forward edge and
    /// cancelling flow for a reverse one.
    pub fn push(&mut self, edge: ResidualEdge, amount: u64) -> Result<()> {
        let available = self.residual(edge);
        let tail = self.tail(edge);
        let arc = &mut self.arcs[edge.arc];
        if amount > available {
            return Err(Error::InvariantViolation(format!(
                "cannot push {} along {} -> {}: residual capacity is {}",
                amount, tail, edge.to,
                available
            )));
        }

        let flow = if edge.forward {
            arc.flow.checked_add(amount).filter(|&f| f <= arc.capacity)
        } else {
            arc.flow.checked_sub(amount)
        };
        match flow {
            Some(flow) => {
                arc.flow = flow;
                Ok(())
            }
            None => Err(Error::InvariantViolation(format!(
                "flow on {} -> {} left [0, {}]",
                arc.from, arc.to, arc.capacity
            ))),
        }
    }

    /// `capacity(u, v) - flow(u, v)` for a forward arc, `flow(v, u)` for a reverse
    /// residual, and zero when the nodes are not adjacent.
    pub fn residual_capacity(&self, u: usize, v: usize) -> u64 {
        self.find_edge(u, v).map_or(0, |edge| self.residual(edge))
    }

    /// Pushes `amount` from `u` to `v` through whichever arc joins them.
    pub fn augment(&mut self, u: usize, v: usize, amount: u64) -> Result<()> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        let edge = self.find_edge(u, v).ok_or_else(|| {
            Error::InvariantViolation(format!("no arc between {} and {}", u, v))
        })?;
        self.push(edge, amount)
    }

    /// Nodes reachable from `u` over an edge with positive residual capacity.
    pub fn neighbors_with_residual(&self, u: usize) -> impl Iterator<Item = usize> + '_ {
        self.residual_edges(u)
            .filter(move |&edge| self.residual(edge) > 0)
            .map(|edge| edge.to)
    }

    /// Flow on the forward arc `u -> v`, if there is one.
    pub fn flow(&self, u: usize, v: usize) -> Option<u64> {
        self.outgoing
            .get(u)?
            .iter()
            .map(|&arc| &self.arcs[arc])
            .find(|arc| arc.to == v)
            .map(|arc| arc.flow)
    }

    /// Flow leaving `u` minus flow entering it.
    pub fn net_outflow(&self, u: usize) -> i128 {
        let out: i128 = self
            .outgoing
            .get(u)
            .into_iter()
            .flatten()
            .map(|&arc| self.arcs[arc].flow as i128)
            .sum();
        let inflow: i128 = self
            .incoming
            .get(u)
            .into_iter()
            .flatten()
            .map(|&arc| self.arcs[arc].flow as i128)
            .sum();
        out - inflow
    }

    pub fn check_capacity(&self) -> Result<()> {
        match self.arcs.iter().find(|arc| arc.flow > arc.capacity) {
            Some(arc) => Err(Error::InvariantViolation(format!(
                "flow {} on {} -> {} exceeds capacity {}",
                arc.flow, arc.from, arc.to, arc.capacity
            ))),
            None => Ok(()),
        }
    }

    /// Checks inflow equals outflow at every node other than `source` and `sink`.
    pub fn check_conservation(&self, source: usize, sink: usize) -> Result<()> {
        for u in 0..self.node_count() {
            if u == source || u == sink {
                continue;
            }
            let imbalance = self.net_outflow(u);
            if imbalance != 0 {
                return Err(Error::InvariantViolation(format!(
                    "node {} is out of balance by {}",
                    u, imbalance
                )));
            }
        }
        Ok(())
    }
}
