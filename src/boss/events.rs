//! Typed encounter event log
//!
//! Every externally observable occurrence lands here; the orchestrator
//! drains the log after ticking the session. This replaces ad-hoc
//! callback wiring: tests and UIs read one stream.

use serde::{Deserialize, Serialize};

use crate::boss::state::{BossPhase, BossState};
use crate::core::types::{ActorId, RewardId};

/// Log entry with its stamp in encounter seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterEvent {
    pub at: f32,
    pub kind: EncounterEventKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterEventKind {
    /// A boss finished a state transition
    StateChanged {
        boss: ActorId,
        from: BossState,
        to: BossState,
    },
    /// Damage crossed a health tier
    PhaseChanged { boss: ActorId, phase: BossPhase },
    /// A passive boss turned hostile
    CombatStarted { boss: ActorId },
    /// A hostile boss's death timeline completed
    Defeated { boss: ActorId },
    /// Rewards granted for a defeat
    RewardsGranted { boss: ActorId, rewards: Vec<RewardId> },
    /// The boss took damage
    BossDamaged {
        boss: ActorId,
        amount: i32,
        health: i32,
    },
    /// The target took damage
    TargetDamaged { amount: i32, health: i32 },
    /// The target's health reached zero
    TargetDown,
}

/// Append-only event log drained by the orchestrator
#[derive(Debug, Clone, Default)]
pub struct EncounterLog {
    pub events: Vec<EncounterEvent>,
}

impl EncounterLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EncounterEventKind, description: String, at: f32) {
        self.events.push(EncounterEvent { at, kind, description });
    }

    pub fn events(&self) -> &[EncounterEvent] {
        &self.events
    }

    /// Removes and returns everything logged so far
    pub fn drain(&mut self) -> Vec<EncounterEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter_kinds(&self) -> impl Iterator<Item = &EncounterEventKind> {
        self.events.iter().map(|e| &e.kind)
    }

    pub fn count_matching(&self, pred: impl Fn(&EncounterEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_log() {
        let mut log = EncounterLog::new();
        let boss = ActorId::new();
        log.push(
            EncounterEventKind::CombatStarted { boss },
            "combat started".into(),
            1.5,
        );
        log.push(
            EncounterEventKind::Defeated { boss },
            "boss defeated".into(),
            20.0,
        );

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.events().is_empty());
        assert_eq!(drained[0].at, 1.5);
    }

    #[test]
    fn test_count_matching() {
        let mut log = EncounterLog::new();
        let boss = ActorId::new();
        for amount in [3, 4] {
            log.push(
                EncounterEventKind::BossDamaged { boss, amount, health: 10 - amount },
                format!("boss took {}", amount),
                0.0,
            );
        }
        log.push(EncounterEventKind::TargetDown, "target down".into(), 2.0);

        let damage_events =
            log.count_matching(|k| matches!(k, EncounterEventKind::BossDamaged { .. }));
        assert_eq!(damage_events, 2);
    }
}
