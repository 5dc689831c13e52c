//! Contact graph and per-node disease state.

use episim_types::{Compartment, CompartmentCounts, GraphError, NodeId};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Validated, immutable contact graph.
///
/// Symmetric, no self-loops, no duplicate edges. Built once and shared
/// read-only (behind an `Arc`) by every replicate of an ensemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    neighbors: Vec<Vec<NodeId>>,
    edge_count: usize,
}

impl Adjacency {
    /// Build from one neighbour list per node.
    ///
    /// Both directions of every edge must be listed.
    pub fn from_lists(lists: Vec<Vec<usize>>) -> Result<Self, GraphError> {
        let node_count = lists.len();
        let mut neighbors = Vec::with_capacity(node_count);
        let mut edges = HashSet::new();

        for (index, list) in lists.iter().enumerate() {
            let node = NodeId::from_index(index);
            let mut seen = HashSet::with_capacity(list.len());
            let mut ids = Vec::with_capacity(list.len());
            for &neighbor in list {
                if neighbor >= node_count {
                    return Err(GraphError::DanglingNeighbor {
                        node,
                        neighbor,
                        node_count,
                    });
                }
                let neighbor = NodeId::from_index(neighbor);
                if neighbor == node {
                    return Err(GraphError::SelfLoop(node));
                }
                if !seen.insert(neighbor) {
                    return Err(GraphError::DuplicateEdge { node, neighbor });
                }
                edges.insert((node, neighbor));
                ids.push(neighbor);
            }
            neighbors.push(ids);
        }

        for (index, list) in neighbors.iter().enumerate() {
            let node = NodeId::from_index(index);
            if let Some(&neighbor) = list.iter().find(|n| !edges.contains(&(**n, node))) {
                return Err(GraphError::AsymmetricEdge { node, neighbor });
            }
        }

        Ok(Self {
            neighbors,
            edge_count: edges.len() / 2,
        })
    }

    /// Build from an undirected edge list; each edge is listed once.
    pub fn from_edges<I>(node_count: usize, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut lists = vec![Vec::new(); node_count];
        for (a, b) in edges {
            if a >= node_count || b >= node_count {
                let (node, neighbor) = if a >= node_count { (b, a) } else { (a, b) };
                return Err(GraphError::DanglingNeighbor {
                    node: NodeId::from_index(node),
                    neighbor,
                    node_count,
                });
            }
            lists[a].push(b);
            if a != b {
                lists[b].push(a);
            }
        }
        Self::from_lists(lists)
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        &self.neighbors[node.index()]
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors[node.index()].len()
    }

    /// Average degree over all nodes.
    pub fn mean_degree(&self) -> f64 {
        if self.neighbors.is_empty() {
            return 0.0;
        }
        (2 * self.edge_count) as f64 / self.neighbors.len() as f64
    }
}

/// Mutable disease state of one individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// Current compartment.
    pub compartment: Compartment,

    /// Bumped whenever this node's outgoing events are recomputed. An event
    /// carrying an older epoch is stale.
    pub epoch: u64,
}

/// Arena of nodes plus the shared graph they live on.
#[derive(Debug, Clone)]
pub struct Population {
    nodes: Vec<Node>,
    adjacency: Arc<Adjacency>,
}

impl Population {
    /// Everyone susceptible, every epoch zero.
    pub fn new(adjacency: Arc<Adjacency>) -> Self {
        let nodes = vec![
            Node {
                compartment: Compartment::Susceptible,
                epoch: 0,
            };
            adjacency.node_count()
        ];
        Self { nodes, adjacency }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn adjacency(&self) -> &Arc<Adjacency> {
        &self.adjacency
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn compartment(&self, id: NodeId) -> Compartment {
        self.nodes[id.index()].compartment
    }

    pub fn epoch(&self, id: NodeId) -> u64 {
        self.nodes[id.index()].epoch
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.neighbors(id)
    }

    /// Identifiers of every node, in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    /// Compartment counts over the neighbours of `id`.
    pub fn neighbor_counts(&self, id: NodeId) -> CompartmentCounts {
        CompartmentCounts::tally(
            self.adjacency
                .neighbors(id)
                .iter()
                .map(|n| self.nodes[n.index()].compartment),
        )
    }

    /// Full scan of every node. Used to seed the live counts at time zero.
    pub fn counts(&self) -> CompartmentCounts {
        CompartmentCounts::tally(self.nodes.iter().map(|n| n.compartment))
    }

    /// Advance the epoch of `id`, invalidating every event generated for it
    /// so far. Returns the new epoch.
    pub fn bump_epoch(&mut self, id: NodeId) -> u64 {
        let node = &mut self.nodes[id.index()];
        node.epoch += 1;
        node.epoch
    }

    /// Move `id` into `compartment` and bump its epoch. Returns the
    /// compartment it left.
    pub fn set_compartment(&mut self, id: NodeId, compartment: Compartment) -> Compartment {
        let node = &mut self.nodes[id.index()];
        let previous = node.compartment;
        node.compartment = compartment;
        node.epoch += 1;
        previous
    }

    /// Move `count` distinct susceptible nodes, chosen uniformly without
    /// replacement, into `compartment`. `count` is capped at the number of
    /// susceptible nodes.
    pub fn seed_infections<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        compartment: Compartment,
        rng: &mut R,
    ) -> Vec<NodeId> {
        let susceptible: Vec<NodeId> = self
            .ids()
            .filter(|id| self.compartment(*id) == Compartment::Susceptible)
            .collect();
        let count = count.min(susceptible.len());

        let chosen: Vec<NodeId> = rand::seq::index::sample(rng, susceptible.len(), count)
            .into_iter()
            .map(|i| susceptible[i])
            .collect();
        for &id in &chosen {
            self.set_compartment(id, compartment);
        }

        debug!(seeded = chosen.len(), compartment = %compartment, "Seeded initial infections");
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn path(n: usize) -> Arc<Adjacency> {
        Arc::new(Adjacency::from_edges(n, (1..n).map(|i| (i - 1, i))).unwrap())
    }

    #[test]
    fn test_from_edges_symmetrizes() {
        let adjacency = Adjacency::from_edges(4, [(0, 1), (1, 2), (2, 3)]).unwrap();

        assert_eq!(adjacency.node_count(), 4);
        assert_eq!(adjacency.edge_count(), 3);
        assert_eq!(adjacency.neighbors(NodeId(1)), &[NodeId(0), NodeId(2)]);
        assert_eq!(adjacency.degree(NodeId(3)), 1);
        assert!((adjacency.mean_degree() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_self_loop() {
        assert_eq!(
            Adjacency::from_edges(3, [(0, 1), (2, 2)]),
            Err(GraphError::SelfLoop(NodeId(2)))
        );
    }

    #[test]
    fn test_rejects_duplicate_edge() {
        assert_eq!(
            Adjacency::from_edges(3, [(0, 1), (1, 0)]),
            Err(GraphError::DuplicateEdge {
                node: NodeId(0),
                neighbor: NodeId(1)
            })
        );
    }

    #[test]
    fn test_rejects_dangling_neighbor() {
        assert_eq!(
            Adjacency::from_lists(vec![vec![1], vec![0, 5]]),
            Err(GraphError::DanglingNeighbor {
                node: NodeId(1),
                neighbor: 5,
                node_count: 2
            })
        );
    }

    #[test]
    fn test_rejects_asymmetric_edge() {
        let result = Adjacency::from_lists(vec![vec![1], vec![]]);
        assert_eq!(
            result,
            Err(GraphError::AsymmetricEdge {
                node: NodeId(0),
                neighbor: NodeId(1)
            })
        );
    }

    #[test]
    fn test_neighbor_counts_follow_compartments() {
        let mut population = Population::new(path(3));
        population.set_compartment(NodeId(0), Compartment::Carrier);
        population.set_compartment(NodeId(2), Compartment::Infected);

        let counts = population.neighbor_counts(NodeId(1));
        assert_eq!(counts[Compartment::Carrier], 1);
        assert_eq!(counts[Compartment::Infected], 1);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_set_compartment_bumps_epoch() {
        let mut population = Population::new(path(2));
        assert_eq!(population.epoch(NodeId(0)), 0);

        let previous = population.set_compartment(NodeId(0), Compartment::Exposed);
        assert_eq!(previous, Compartment::Susceptible);
        assert_eq!(population.epoch(NodeId(0)), 1);
        assert_eq!(population.bump_epoch(NodeId(0)), 2);
    }

    #[test]
    fn test_seed_infections_without_replacement() {
        let mut population = Population::new(path(10));
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let seeded = population.seed_infections(4, Compartment::Carrier, &mut rng);
        let unique: HashSet<_> = seeded.iter().collect();
        assert_eq!(unique.len(), 4);
        assert_eq!(population.counts()[Compartment::Carrier], 4);

        // Capped at the remaining susceptible nodes.
        let seeded = population.seed_infections(100, Compartment::Carrier, &mut rng);
        assert_eq!(seeded.len(), 6);
        assert_eq!(population.counts()[Compartment::Susceptible], 0);
    }
}
