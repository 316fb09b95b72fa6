use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::network::NodeId;

/// A capacitated arc between two node indices of a [`Topology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcSpec {
    pub from: usize,
    pub to: usize,
    pub capacity: u64,
}

/// Immutable snapshot of a flow network: node ids, arcs and the two terminals.
///
/// Nodes are addressed by dense indices in the order they were supplied. Arcs keep
/// their creation order, which solvers use to break ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    nodes: Vec<NodeId>,
    arcs: Vec<ArcSpec>,
    source: usize,
    sink: usize,
}

impl Topology {
    /// Builds an arc-less topology whose terminals are the nodes `A` and `T`.
    pub fn new(nodes: Vec<NodeId>) -> Result<Self> {
        let source = position(&nodes, NodeId::SOURCE)?;
        let sink = position(&nodes, NodeId::SINK)?;
        Self::with_terminals(nodes, source, sink)
    }

    /// Builds an arc-less topology with explicit terminal indices.
    ///
    /// Source and sink may coincide; solvers then report a zero flow.
    pub fn with_terminals(nodes: Vec<NodeId>, source: usize, sink: usize) -> Result<Self> {
        for (i, node) in nodes.iter().enumerate() {
            if nodes[..i].contains(node) {
                return Err(Error::InvalidVertex(i));
            }
        }
        for terminal in [source, sink] {
            if terminal >= nodes.len() {
                return Err(Error::InvalidVertex(terminal));
            }
        }
        Ok(Self {
            nodes,
            arcs: Vec::new(),
            source,
            sink,
        })
    }

    /// Builds a topology from `(from, to, capacity)` letter triples.
    ///
    /// Nodes are numbered `A` first, `T` last and the rest in order of first appearance.
    pub fn from_arcs(arcs: &[(char, char, u64)]) -> Result<Self> {
        let mut nodes = vec![NodeId::SOURCE];
        for &(from, to, _) in arcs {
            for letter in [from, to] {
                let node = NodeId::new(letter).ok_or(Error::InvalidNodeId(letter))?;
                if !node.is_sink() && !nodes.contains(&node) {
                    nodes.push(node);
                }
            }
        }
        nodes.push(NodeId::SINK);

        let mut topology = Self::new(nodes)?;
        for &(from, to, capacity) in arcs {
            let u = topology.lookup(from)?;
            let v = topology.lookup(to)?;
            topology.add_arc(u, v, capacity)?;
        }
        Ok(topology)
    }

    /// Appends an arc and returns its index.
    pub fn add_arc(&mut self, from: usize, to: usize, capacity: u64) -> Result<usize> {
        let n = self.nodes.len();
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
        for arc in &self.arcs {
            if arc.from == from && arc.to == to {
                return Err(Error::InvalidArc {
                    from,
                    to,
                    reason: "duplicate arc",
                });
            }
            if arc.from == to && arc.to == from {
                return Err(Error::InvalidArc {
                    from,
                    to,
                    reason: "anti-parallel arc",
                });
            }
        }
        self.arcs.push(ArcSpec { from, to, capacity });
        Ok(self.arcs.len() - 1)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn arcs(&self) -> &[ArcSpec] {
        &self.arcs
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn sink(&self) -> usize {
        self.sink
    }

    pub fn node(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    fn lookup(&self, letter: char) -> Result<usize> {
        let node = NodeId::new(letter).ok_or(Error::InvalidNodeId(letter))?;
        self.index_of(node).ok_or(Error::UnknownNode(node))
    }

    /// Whether the sink is reachable from the source along forward arcs.
    pub fn has_path(&self) -> bool {
        let n = self.nodes.len();
        let mut adjacency = vec![Vec::new(); n];
        for arc in &self.arcs {
            adjacency[arc.from].push(arc.to);
        }

        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        visited[self.source] = true;
        queue.push_back(self.source);

        while let Some(u) = queue.pop_front() {
            if u == self.sink {
                return true;
            }
            for &v in &adjacency[u] {
                if !visited[v] {
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }
        false
    }
}

fn position(nodes: &[NodeId], node: NodeId) -> Result<usize> {
    nodes
        .iter()
        .position(|&n| n == node)
        .ok_or(Error::UnknownNode(node))
}
