use thiserror::Error;

use crate::network::NodeId;

/// Errors produced while generating networks or computing flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The generator could not sample a network with a source to sink path.
    #[error("failed to generate a connected network after {attempts} attempts")]
    GenerationFailure { attempts: usize },

    /// A residual graph mutation or a converged flow broke a flow invariant.
    #[error("flow invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid generator policy: {0}")]
    InvalidPolicy(&'static str),

    #[error("vertex index {0} is out of range")]
    InvalidVertex(usize),

    #[error("invalid arc {from} -> {to}: {reason}")]
    InvalidArc {
        from: usize,
        to: usize,
        reason: &'static str,
    },

    #[error("node id {0:?} is not an uppercase ASCII letter")]
    InvalidNodeId(char),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
