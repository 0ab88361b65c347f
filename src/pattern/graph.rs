//! Directed attack-pattern graphs
//!
//! Nodes name a pattern state plus the successors it may chain into.
//! Openers are distance-gated; chaining is a single roll against the
//! node's continuation probability, capped by the boss's combo limit.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::boss::state::BossState;
use crate::core::error::{EncounterError, Result};

/// Index of a node within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

fn default_continuation() -> f32 {
    0.8
}

fn default_max_distance() -> f32 {
    // Effectively unbounded on a standard field
    100.0
}

/// One pattern the boss can perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackPatternNode {
    /// Pattern state whose timeline drives this node
    pub state: BossState,
    /// Nodes this one may chain into
    #[serde(default)]
    pub successors: Vec<NodeId>,
    /// Chance the chain continues past this node
    #[serde(default = "default_continuation")]
    pub continuation_probability: f32,
    /// Closest boss-target separation at which this node opens
    #[serde(default)]
    pub min_distance: f32,
    /// Farthest separation at which this node opens
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
}

impl AttackPatternNode {
    pub fn new(state: BossState) -> Self {
        Self {
            state,
            successors: Vec::new(),
            continuation_probability: default_continuation(),
            min_distance: 0.0,
            max_distance: default_max_distance(),
        }
    }

    pub fn with_successors(mut self, successors: Vec<NodeId>) -> Self {
        self.successors = successors;
        self
    }

    pub fn with_continuation(mut self, probability: f32) -> Self {
        self.continuation_probability = probability;
        self
    }

    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    pub fn in_range(&self, distance: f32) -> bool {
        distance >= self.min_distance && distance <= self.max_distance
    }
}

/// Validated set of pattern nodes
#[derive(Debug, Clone)]
pub struct PatternGraph {
    nodes: Vec<AttackPatternNode>,
}

impl PatternGraph {
    /// Builds a graph, rejecting malformed node sets
    pub fn new(nodes: Vec<AttackPatternNode>) -> Result<Self> {
        for (index, node) in nodes.iter().enumerate() {
            if !node.state.is_pattern() {
                return Err(EncounterError::InvalidPatternGraph(format!(
                    "node {} uses non-pattern state '{}'",
                    index, node.state
                )));
            }
            if !(0.0..=1.0).contains(&node.continuation_probability) {
                return Err(EncounterError::InvalidPatternGraph(format!(
                    "node {} continuation probability {} outside [0, 1]",
                    index, node.continuation_probability
                )));
            }
            if node.min_distance > node.max_distance {
                return Err(EncounterError::InvalidPatternGraph(format!(
                    "node {} distance band [{}, {}] is inverted",
                    index, node.min_distance, node.max_distance
                )));
            }
            for successor in &node.successors {
                if successor.0 >= nodes.len() {
                    return Err(EncounterError::InvalidPatternGraph(format!(
                        "node {} links to missing node {}",
                        index, successor.0
                    )));
                }
                // A self-chain replays the same timeline with no state
                // change; treat it as an authoring error. Longer cycles
                // (0 -> 1 -> 0) stay legal.
                if successor.0 == index {
                    return Err(EncounterError::InvalidPatternGraph(format!(
                        "node {} links to itself",
                        index
                    )));
                }
            }
        }
        Ok(Self { nodes })
    }

    /// Graph with no nodes; openers always abstain
    pub fn empty() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn node(&self, id: NodeId) -> Option<&AttackPatternNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node whose distance band contains `distance`
    pub fn openers_in_range(&self, distance: f32) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.in_range(distance))
            .map(|(index, _)| NodeId(index))
            .collect()
    }

    /// Uniform pick among in-range openers; None when nothing reaches
    pub fn select_opener(&self, distance: f32, rng: &mut impl Rng) -> Option<NodeId> {
        let candidates = self.openers_in_range(distance);
        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    }

    /// Chain gate evaluated when a pattern node's timeline completes
    ///
    /// The continuation roll is drawn first; the chain ends when the roll
    /// fails, the combo cap is reached, or the node has no successors.
    pub fn roll_chain(
        &self,
        from: NodeId,
        combo_count: u32,
        max_combo: u32,
        rng: &mut impl Rng,
    ) -> Option<NodeId> {
        let node = self.node(from)?;
        let roll: f32 = rng.gen();
        if roll >= node.continuation_probability
            || combo_count >= max_combo
            || node.successors.is_empty()
        {
            return None;
        }
        Some(node.successors[rng.gen_range(0..node.successors.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn melee_graph() -> PatternGraph {
        // 0: close slash chains to 1 or 2; 1: thrust chains to 2;
        // 2: finisher ends the chain; 3: ranged-only opener
        PatternGraph::new(vec![
            AttackPatternNode::new(BossState::Attack(1))
                .with_range(0.0, 2.0)
                .with_successors(vec![NodeId(1), NodeId(2)]),
            AttackPatternNode::new(BossState::Attack(2))
                .with_range(0.0, 2.0)
                .with_successors(vec![NodeId(2)]),
            AttackPatternNode::new(BossState::Attack(3)).with_range(0.0, 2.0),
            AttackPatternNode::new(BossState::Skill).with_range(4.0, 100.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_distance_gates_openers() {
        let graph = melee_graph();
        assert_eq!(
            graph.openers_in_range(1.0),
            vec![NodeId(0), NodeId(1), NodeId(2)]
        );
        assert_eq!(graph.openers_in_range(5.0), vec![NodeId(3)]);
        assert!(graph.openers_in_range(3.0).is_empty());
    }

    #[test]
    fn test_opener_abstains_out_of_range() {
        let graph = melee_graph();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(graph.select_opener(3.0, &mut rng), None);
        assert_eq!(graph.select_opener(5.0, &mut rng), Some(NodeId(3)));
    }

    #[test]
    fn test_opener_uniform_over_candidates() {
        let graph = melee_graph();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = [0u32; 3];
        for _ in 0..600 {
            match graph.select_opener(1.0, &mut rng) {
                Some(NodeId(i)) if i < 3 => seen[i] += 1,
                other => panic!("unexpected opener {:?}", other),
            }
        }
        for count in seen {
            // Uniform over three candidates, 600 draws
            assert!((120..=280).contains(&count), "skewed counts: {:?}", seen);
        }
    }

    #[test]
    fn test_chain_ends_without_successors() {
        let graph = melee_graph();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(graph.roll_chain(NodeId(2), 1, 4, &mut rng), None);
        }
    }

    #[test]
    fn test_chain_respects_combo_cap() {
        let graph = melee_graph();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(graph.roll_chain(NodeId(0), 4, 4, &mut rng), None);
        }
    }

    #[test]
    fn test_chain_follows_successor_edges() {
        let graph = melee_graph();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            if let Some(next) = graph.roll_chain(NodeId(0), 0, 4, &mut rng) {
                assert!(next == NodeId(1) || next == NodeId(2));
            }
        }
    }

    #[test]
    fn test_zero_probability_never_chains() {
        let graph = PatternGraph::new(vec![
            AttackPatternNode::new(BossState::Attack(1))
                .with_continuation(0.0)
                .with_successors(vec![NodeId(1)]),
            AttackPatternNode::new(BossState::Attack(2)),
        ])
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(graph.roll_chain(NodeId(0), 0, 4, &mut rng), None);
        }
    }

    #[test]
    fn test_dangling_successor_rejected() {
        let result = PatternGraph::new(vec![
            AttackPatternNode::new(BossState::Attack(1)).with_successors(vec![NodeId(5)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_pattern_state_rejected() {
        let result = PatternGraph::new(vec![AttackPatternNode::new(BossState::Idle)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_self_link_rejected() {
        let result = PatternGraph::new(vec![
            AttackPatternNode::new(BossState::Attack(1)).with_successors(vec![NodeId(0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let result =
            PatternGraph::new(vec![AttackPatternNode::new(BossState::Skill).with_range(5.0, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_node_defaults_from_toml() {
        let node: AttackPatternNode = toml::from_str(r#"state = "attack1""#).unwrap();
        assert_eq!(node.continuation_probability, 0.8);
        assert_eq!(node.min_distance, 0.0);
        assert_eq!(node.max_distance, 100.0);
        assert!(node.successors.is_empty());
    }
}
