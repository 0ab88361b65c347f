//! Frame-sequenced animation timelines and their player

pub mod frame;
pub mod player;

pub use frame::{SpriteRef, Timeline, TimelineFrame, TweenSpec};
pub use player::{TimelineEvent, TimelinePlayer, Visual};
