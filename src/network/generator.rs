//! Random layered flow networks.
//!
//! A network is sampled as a stack of layers: the source `A`, a few layers of
//! intermediate nodes, and the sink `T`. Arcs only run from one layer to the next, or
//! forward inside a layer, so the result is acyclic and never holds an arc in both
//! directions between a pair of nodes. Arcs and nodes that lie on no `A -> T` path
//! are pruned; samples left without any such path are thrown away and redrawn a
//! bounded number of times.

use log::{debug, error};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::network::{NodeId, Topology};

/// Smallest capacity the generator assigns to an arc.
pub const MIN_CAPACITY: u64 = 5;
/// Largest capacity the generator assigns to an arc.
pub const MAX_CAPACITY: u64 = 15;

/// Shape parameters for generated networks.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorPolicy {
    /// Number of intermediate layers between source and sink
    pub layers: RangeInclusive<usize>,
    /// Number of nodes in each intermediate layer
    pub layer_width: RangeInclusive<usize>,
    /// Probability of an arc between two nodes of consecutive layers
    pub edge_probability: f64,
    /// Probability of an arc from a node to a later node of the same layer
    pub lateral_probability: f64,
    /// Samples drawn before giving up
    pub max_attempts: usize,
}

impl Default for GeneratorPolicy {
    fn default() -> Self {
        Self {
            layers: 2..=3,
            layer_width: 2..=3,
            edge_probability: 0.7,
            lateral_probability: 0.2,
            max_attempts: 16,
        }
    }
}

impl GeneratorPolicy {
    fn validate(&self) -> Result<()> {
        if self.layers.is_empty() || self.layer_width.is_empty() {
            return Err(Error::InvalidPolicy("empty layer range"));
        }
        if *self.layer_width.start() == 0 {
            return Err(Error::InvalidPolicy("layers must hold at least one node"));
        }
        let probabilities = [self.edge_probability, self.lateral_probability];
        if probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(Error::InvalidPolicy("probability outside [0, 1]"));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidPolicy("max_attempts must be positive"));
        }
        let widest = self.layers.end().saturating_mul(*self.layer_width.end());
        if widest > NodeId::intermediates().count() {
            return Err(Error::InvalidPolicy("not enough letters for intermediate nodes"));
        }
        Ok(())
    }
}

/// Seeded source of random [`Topology`] values.
#[derive(Debug, Clone)]
pub struct NetworkGenerator {
    policy: GeneratorPolicy,
    rng: ChaCha8Rng,
}

impl NetworkGenerator {
    /// Seeds from `seed` when given, otherwise from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            policy: GeneratorPolicy::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            policy: GeneratorPolicy::default(),
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_policy(mut self, policy: GeneratorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &GeneratorPolicy {
        &self.policy
    }

    /// Samples networks until one has an `A -> T` path.
    ///
    /// Fails with [`Error::GenerationFailure`] once `max_attempts` samples were
    /// disconnected.
    pub fn generate(&mut self) -> Result<Topology> {
        self.policy.validate()?;

        for attempt in 1..=self.policy.max_attempts {
            let candidate = self.sample()?;
            if candidate.has_path() {
                debug!(
                    "generated network with {} nodes and {} arcs on attempt {}",
                    candidate.node_count(),
                    candidate.arcs().len(),
                    attempt
                );
                return Ok(candidate);
            }
            debug!("attempt {}: sampled network has no A -> T path", attempt);
        }

        error!(
            "no connected network after {} attempts with {:?}",
            self.policy.max_attempts, self.policy
        );
        Err(Error::GenerationFailure {
            attempts: self.policy.max_attempts,
        })
    }

    fn sample(&mut self) -> Result<Topology> {
        // Slot 0 is the source; slots are relabelled once unused ones are dropped.
        let layer_count = self.rng.gen_range(self.policy.layers.clone());
        let mut layers: Vec<Vec<usize>> = vec![vec![0]];
        let mut next_slot = 1;
        for _ in 0..layer_count {
            let width = self.rng.gen_range(self.policy.layer_width.clone());
            layers.push((next_slot..next_slot + width).collect());
            next_slot += width;
        }
        let sink_slot = next_slot;
        layers.push(vec![sink_slot]);

        let mut pairs = Vec::new();
        for window in layers.windows(2) {
            for &u in &window[0] {
                for &v in &window[1] {
                    if self.rng.gen_bool(self.policy.edge_probability) {
                        pairs.push((u, v));
                    }
                }
            }
        }
        for layer in &layers[1..layers.len() - 1] {
            for (j, &u) in layer.iter().enumerate() {
                for &v in &layer[j + 1..] {
                    if self.rng.gen_bool(self.policy.lateral_probability) {
                        pairs.push((u, v));
                    }
                }
            }
        }
        pairs.sort_unstable();

        // Slots are numbered in layer order, so every pair runs from a lower slot to a
        // higher one and one sweep in each direction settles reachability.
        let mut from_source = vec![false; sink_slot + 1];
        from_source[0] = true;
        for &(u, v) in &pairs {
            from_source[v] |= from_source[u];
        }
        let mut to_sink = vec![false; sink_slot + 1];
        to_sink[sink_slot] = true;
        for &(u, v) in pairs.iter().rev() {
            to_sink[u] |= to_sink[v];
        }
        // Keep only arcs on some source to sink path.
        pairs.retain(|&(u, v)| from_source[u] && to_sink[v]);

        let mut used = vec![false; sink_slot + 1];
        used[0] = true;
        used[sink_slot] = true;
        for &(u, v) in &pairs {
            used[u] = true;
            used[v] = true;
        }

        let mut index = vec![None; sink_slot + 1];
        let mut nodes = vec![NodeId::SOURCE];
        let mut letters = NodeId::intermediates();
        index[0] = Some(0);
        for slot in 1..sink_slot {
            if used[slot] {
                let letter = letters
                    .next()
                    .ok_or(Error::InvalidPolicy("not enough letters for intermediate nodes"))?;
                index[slot] = Some(nodes.len());
                nodes.push(letter);
            }
        }
        index[sink_slot] = Some(nodes.len());
        nodes.push(NodeId::SINK);

        let mut topology = Topology::new(nodes)?;
        for (u, v) in pairs {
            let capacity = self.rng.gen_range(MIN_CAPACITY..=MAX_CAPACITY);
            // Every slot touched by an arc was given an index above.
            if let (Some(from), Some(to)) = (index[u], index[v]) {
                topology.add_arc(from, to, capacity)?;
            }
        }
        Ok(topology)
    }
}
