//! Encounter tuning with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Per-boss values are loadable from
//! encounter definition files; the defaults reproduce the shipped bosses'
//! baseline feel.

use serde::{Deserialize, Serialize};

use crate::core::types::FieldBounds;

/// Per-boss behavior tuning
///
/// These values control encounter pacing. They interact: idle delays gate
/// how often decision rolls happen, and the teleport/chase chances split
/// those rolls before opener selection ever runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    // === HEALTH AND PHASES ===
    /// Hit points at spawn
    pub max_health: i32,

    /// Health ratio at or below which the boss enters Phase2
    ///
    /// Recomputed only when damage lands, so healing (if a mode ever adds
    /// it) cannot un-cross a tier mid-fight.
    pub phase2_threshold: f32,

    /// Health ratio at or below which the boss enters Phase3
    ///
    /// Must stay below `phase2_threshold` or validation rejects the tuning.
    pub phase3_threshold: f32,

    // === DECISION PACING ===
    /// Lower bound of the idle delay drawn after each return to Idle (seconds)
    pub min_idle_delay: f32,

    /// Upper bound of the idle delay (seconds)
    ///
    /// Longer idles read as a slower, more deliberate boss; the draw is
    /// uniform over `[min_idle_delay, max_idle_delay]`.
    pub max_idle_delay: f32,

    /// Probability that an expired idle rolls into Teleport instead of
    /// an attack decision
    pub teleport_chance: f32,

    /// Probability that an expired idle rolls into a chase when the
    /// teleport roll failed
    pub chase_chance: f32,

    // === MOVEMENT ===
    /// Chase movement speed (units/second)
    pub chase_speed: f32,

    /// Maximum chase duration before forcing an attack decision (seconds)
    ///
    /// Prevents a fast target from kiting the boss forever.
    pub chase_duration: f32,

    /// Separation at which a chase stops early and attacks (units)
    ///
    /// Should sit inside the distance band of at least one opener or the
    /// chase ends in a whiffed decision and re-idles.
    pub optimal_attack_distance: f32,

    /// Entry-walk movement speed after intro and teleport returns
    /// (units/second)
    pub walk_speed: f32,

    // === COMBO CHAIN ===
    /// Hard cap on consecutive pattern nodes in one chain
    ///
    /// The chain gate also rolls per-node continuation, so typical chains
    /// land well under the cap.
    pub max_combo_count: u32,

    // === DAMAGE RESPONSE ===
    /// Seconds of damage immunity after entering the Hit state
    ///
    /// Suppresses Hit re-entry so rapid hits cannot stun-lock the boss.
    pub invincibility_window: f32,

    /// Seconds between a passive boss taking its first hit and turning
    /// hostile (dialogue beat)
    pub provocation_delay: f32,

    // === SKILL LOOP ===
    /// Delay before the first skill-loop invocation after arming (seconds)
    pub skill_initial_delay: f32,

    // === TELEPORT BOUNDS ===
    /// Horizontal distance of the off-field relocation point (units)
    ///
    /// Slightly beyond the field half-width so the boss is fully offstage.
    pub offstage_x: f32,

    /// Lowest y drawn for the relocation point (units)
    pub teleport_min_y: f32,

    /// Highest y drawn for the relocation point (units)
    pub teleport_max_y: f32,

    /// Horizontal magnitude of the on-field entry point walked back to
    /// after a teleport or intro (units)
    pub entry_x: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            // Health (tiers: >66% / 33-66% / <=33%)
            max_health: 100,
            phase2_threshold: 0.66,
            phase3_threshold: 0.33,

            // Pacing
            min_idle_delay: 0.5,
            max_idle_delay: 1.5,
            teleport_chance: 0.0,
            chase_chance: 0.0,

            // Movement
            chase_speed: 5.0,
            chase_duration: 2.0,
            optimal_attack_distance: 1.2,
            walk_speed: 3.0,

            // Combo
            max_combo_count: 4,

            // Damage response
            invincibility_window: 0.5,
            provocation_delay: 2.0,

            // Skill loop
            skill_initial_delay: 1.0,

            // Teleport bounds
            offstage_x: 9.0,
            teleport_min_y: -3.0,
            teleport_max_y: 3.0,
            entry_x: 5.0,
        }
    }
}

impl BossTuning {
    /// Validate tuning for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.max_health <= 0 {
            return Err(format!("max_health ({}) must be positive", self.max_health));
        }

        if self.min_idle_delay > self.max_idle_delay {
            return Err(format!(
                "min_idle_delay ({}) should be <= max_idle_delay ({})",
                self.min_idle_delay, self.max_idle_delay
            ));
        }

        // Tiers must be ordered or phase derivation is ambiguous
        if self.phase3_threshold >= self.phase2_threshold {
            return Err(format!(
                "phase3_threshold ({}) should be < phase2_threshold ({})",
                self.phase3_threshold, self.phase2_threshold
            ));
        }

        for (name, chance) in [
            ("teleport_chance", self.teleport_chance),
            ("chase_chance", self.chase_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(format!("{} ({}) must be within [0, 1]", name, chance));
            }
        }

        if self.max_combo_count == 0 {
            return Err("max_combo_count must be at least 1".into());
        }

        Ok(())
    }
}

/// Session-level tuning shared by every boss in an encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Playable field extents; spawnables leaving them despawn
    pub bounds: FieldBounds,

    /// Delay before a freshly scheduled pattern task first fires (seconds)
    ///
    /// Gives the boss intro a beat before hazards start raining.
    pub task_initial_delay: f32,

    /// Baseline speed multiplier applied to pattern task cadence
    ///
    /// Difficulty scaling raises this; intervals divide by it, so 2.0
    /// halves the time between spawns.
    pub speed_multiplier: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bounds: FieldBounds::default(),
            task_initial_delay: 1.0,
            speed_multiplier: 1.0,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.speed_multiplier <= 0.0 {
            return Err(format!(
                "speed_multiplier ({}) must be positive",
                self.speed_multiplier
            ));
        }
        if self.task_initial_delay < 0.0 {
            return Err(format!(
                "task_initial_delay ({}) must not be negative",
                self.task_initial_delay
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_validates() {
        assert!(BossTuning::default().validate().is_ok());
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_idle_band_rejected() {
        let tuning = BossTuning {
            min_idle_delay: 2.0,
            max_idle_delay: 1.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_inverted_phase_tiers_rejected() {
        let tuning = BossTuning {
            phase2_threshold: 0.3,
            phase3_threshold: 0.6,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_out_of_range_chance_rejected() {
        let tuning = BossTuning {
            chase_chance: 1.5,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }
}
