//! Attack-pattern graphs: distance-gated openers and combo chains

pub mod graph;

pub use graph::{AttackPatternNode, NodeId, PatternGraph};
