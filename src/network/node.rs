use serde::{Serialize, Serializer};
use std::fmt;

/// Single-letter node identifier. `A` is the source and `T` the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(char);

impl NodeId {
    pub const SOURCE: NodeId = NodeId('A');
    pub const SINK: NodeId = NodeId('T');

    /// Returns `None` unless `letter` is an ASCII uppercase letter.
    pub fn new(letter: char) -> Option<Self> {
        letter.is_ascii_uppercase().then_some(NodeId(letter))
    }

    pub fn letter(self) -> char {
        self.0
    }

    pub fn is_sink(self) -> bool {
        self == Self::SINK
    }

    /// Letters handed out to intermediate nodes, in assignment order.
    pub fn intermediates() -> impl Iterator<Item = NodeId> {
        ('B'..='Z').filter(|&c| c != 'T').map(NodeId)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.0)
    }
}
