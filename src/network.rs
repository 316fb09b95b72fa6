pub mod generator;
pub mod node;
pub mod topology;

pub use generator::{GeneratorPolicy, NetworkGenerator, MAX_CAPACITY, MIN_CAPACITY};
pub use node::NodeId;
pub use topology::{ArcSpec, Topology};
