//! Error types for mortar contact operations.

use crate::types::DofVariable;
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Node counts and dimension of a slave/master combination.
///
/// `master_nodes` is `None` when only the slave side was involved, e.g. when
/// selecting the dual Lagrange multiplier basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryCombination {
    pub dimension: usize,
    pub master_nodes: Option<usize>,
    pub slave_nodes: usize,
}

impl fmt::Display for GeometryCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.master_nodes {
            Some(master) => write!(
                f,
                "{}D with {} master nodes and {} slave nodes",
                self.dimension, master, self.slave_nodes
            ),
            None => write!(f, "{}D with {} slave nodes", self.dimension, self.slave_nodes),
        }
    }
}

/// Errors that can occur during contact operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No closed-form kernel or dual basis exists for this combination.
    #[error("unsupported geometry combination: {0}")]
    UnsupportedGeometryCombination(GeometryCombination),

    /// A batched calculation requested a system component that is not provided.
    #[error("unsupported system variable: {0}")]
    UnsupportedSystemVariable(String),

    /// A node does not carry the requested degree of freedom.
    #[error("node {node} has no degree of freedom {variable:?}")]
    MissingDof { node: usize, variable: DofVariable },

    /// Mesh-related errors.
    #[error("mesh error: {0}")]
    Mesh(String),

    /// Geometry evaluation errors.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Condition used out of its lifecycle order.
    #[error("condition error: {0}")]
    Condition(String),

    /// Global assembly errors.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Invalid contact settings.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    pub(crate) fn unsupported(
        dimension: usize,
        master_nodes: Option<usize>,
        slave_nodes: usize,
    ) -> Self {
        Error::UnsupportedGeometryCombination(GeometryCombination {
            dimension,
            master_nodes,
            slave_nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_combination_message_has_node_counts() {
        let err = Error::unsupported(3, Some(3), 3);
        let msg = err.to_string();
        assert!(msg.contains("3 master nodes"), "{}", msg);
        assert!(msg.contains("3 slave nodes"), "{}", msg);

        let err = Error::unsupported(3, None, 2);
        assert_eq!(
            err.to_string(),
            "unsupported geometry combination: 3D with 2 slave nodes"
        );
    }
}
