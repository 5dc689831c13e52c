//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of an individual in the contact graph.
///
/// Nodes live in an arena (`Vec`) for the whole run, so the identifier is
/// just the position in that arena. Neighbour lists store `NodeId`s rather
/// than references.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of this node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Build an identifier from an arena position.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`. Populations are bounded well
    /// below that by validation.
    pub fn from_index(index: usize) -> Self {
        NodeId(u32::try_from(index).expect("node index exceeds u32::MAX"))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_index_round_trip() {
        let id = NodeId::from_index(42);
        assert_eq!(id, NodeId(42));
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(7).to_string(), "Node(7)");
    }
}
