//! Boss state, phase, and hostility mode

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Highest attack arm a pattern graph may reference
pub const MAX_ATTACK_ARMS: u8 = 8;

/// Machine states a boss moves through
///
/// Attack arms are numbered from 1; each arm, like Skill, Special, and
/// Teleport, is a pattern state whose timeline drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossState {
    Intro,
    Idle,
    Walk,
    Attack(u8),
    Skill,
    Special,
    Teleport,
    Hit,
    Die,
}

impl BossState {
    /// States selected by the pattern graph
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            BossState::Attack(_) | BossState::Skill | BossState::Special | BossState::Teleport
        )
    }

    pub fn parse(s: &str) -> Option<BossState> {
        let state = match s {
            "intro" => BossState::Intro,
            "idle" => BossState::Idle,
            "walk" => BossState::Walk,
            "skill" => BossState::Skill,
            "special" => BossState::Special,
            "teleport" => BossState::Teleport,
            "hit" => BossState::Hit,
            "die" => BossState::Die,
            _ => {
                let n: u8 = s.strip_prefix("attack")?.parse().ok()?;
                if (1..=MAX_ATTACK_ARMS).contains(&n) {
                    BossState::Attack(n)
                } else {
                    return None;
                }
            }
        };
        Some(state)
    }
}

impl std::fmt::Display for BossState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BossState::Intro => write!(f, "intro"),
            BossState::Idle => write!(f, "idle"),
            BossState::Walk => write!(f, "walk"),
            BossState::Attack(n) => write!(f, "attack{}", n),
            BossState::Skill => write!(f, "skill"),
            BossState::Special => write!(f, "special"),
            BossState::Teleport => write!(f, "teleport"),
            BossState::Hit => write!(f, "hit"),
            BossState::Die => write!(f, "die"),
        }
    }
}

// String form in data files: "idle", "attack3", ...
impl Serialize for BossState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BossState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BossState::parse(&s)
            .ok_or_else(|| D::Error::custom(format!("unknown boss state '{}'", s)))
    }
}

/// Health-ratio tier driving attack intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossPhase {
    Phase1,
    Phase2,
    Phase3,
}

impl BossPhase {
    /// Tier for a health ratio given the two configured bounds
    ///
    /// Boundaries are inclusive downward: a ratio exactly on a bound is
    /// already in the lower tier.
    pub fn for_ratio(ratio: f32, phase2_threshold: f32, phase3_threshold: f32) -> Self {
        if ratio <= phase3_threshold {
            BossPhase::Phase3
        } else if ratio <= phase2_threshold {
            BossPhase::Phase2
        } else {
            BossPhase::Phase1
        }
    }
}

/// Hostility mode; the only transition is Passive to Hostile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Passive,
    Hostile,
}
