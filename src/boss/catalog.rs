//! State-to-timeline catalog
//!
//! Each boss maps its reachable states to the timelines that drive them.
//! A state with no mapping is unreachable: the machine rejects the
//! transition and logs instead of guessing.

use std::sync::Arc;

use ahash::AHashMap;

use crate::boss::state::BossState;
use crate::timeline::Timeline;

#[derive(Debug, Clone, Default)]
pub struct TimelineCatalog {
    map: AHashMap<BossState, Arc<Timeline>>,
}

impl TimelineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: BossState, timeline: Timeline) {
        self.map.insert(state, Arc::new(timeline));
    }

    pub fn insert_shared(&mut self, state: BossState, timeline: Arc<Timeline>) {
        self.map.insert(state, timeline);
    }

    pub fn get(&self, state: BossState) -> Option<&Arc<Timeline>> {
        self.map.get(&state)
    }

    pub fn contains(&self, state: BossState) -> bool {
        self.map.contains_key(&state)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
