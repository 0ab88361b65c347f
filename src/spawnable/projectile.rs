//! Pooled projectiles
//!
//! A projectile is launched with a fixed direction and flies until it
//! overlaps the target or leaves the field; either way the session
//! releases it back to its pool. Aiming happens at launch, there is no
//! homing afterward.

use serde::{Deserialize, Serialize};

use crate::core::types::{FieldBounds, Vec2};
use crate::pool::PoolItem;
use crate::timeline::SpriteRef;

fn default_hit_radius() -> f32 {
    0.4
}

/// How a launcher aims a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileAim {
    /// Toward the target's position at fire time
    Targeting,
    /// Along a direction the launcher supplies
    Straight,
}

/// Launch parameters shared by every shot of one projectile kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSpec {
    pub speed: f32,
    pub damage: i32,
    /// Collision radius against the target
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f32,
    #[serde(default)]
    pub sprite: SpriteRef,
}

impl ProjectileSpec {
    pub fn new(speed: f32, damage: i32) -> Self {
        Self {
            speed,
            damage,
            hit_radius: default_hit_radius(),
            sprite: SpriteRef::default(),
        }
    }
}

/// Result of one projectile tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileOutcome {
    Flying,
    HitTarget { damage: i32 },
    /// Off the field, never launched, or already spent
    Expired,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    dir: Vec2,
    speed: f32,
    damage: i32,
    hit_radius: f32,
    pub sprite: SpriteRef,
    live: bool,
}

impl Projectile {
    /// Pool prototype; inert until launched
    pub fn inert() -> Self {
        Self {
            pos: Vec2::ZERO,
            dir: Vec2::ZERO,
            speed: 0.0,
            damage: 0,
            hit_radius: default_hit_radius(),
            sprite: SpriteRef::default(),
            live: false,
        }
    }

    pub fn launch(&mut self, spec: &ProjectileSpec, origin: Vec2, dir: Vec2) {
        self.pos = origin;
        self.dir = dir.normalize();
        self.speed = spec.speed;
        self.damage = spec.damage;
        self.hit_radius = spec.hit_radius;
        self.sprite = spec.sprite.clone();
        self.live = true;
    }

    /// Moves the projectile and reports what should happen to it
    ///
    /// The caller applies damage and releases the projectile; this method
    /// only decides. A dead target no longer blocks flight, so stray
    /// shots still clear the field on their own.
    pub fn advance(
        &mut self,
        dt: f32,
        bounds: FieldBounds,
        target_pos: Vec2,
        target_alive: bool,
    ) -> ProjectileOutcome {
        if !self.live {
            return ProjectileOutcome::Expired;
        }

        self.pos = self.pos + self.dir * (self.speed * dt);

        if !bounds.contains(self.pos) {
            self.live = false;
            return ProjectileOutcome::Expired;
        }

        if target_alive && self.pos.distance(&target_pos) <= self.hit_radius {
            self.live = false;
            return ProjectileOutcome::HitTarget { damage: self.damage };
        }

        ProjectileOutcome::Flying
    }

    pub fn is_live(&self) -> bool {
        self.live
    }
}

impl PoolItem for Projectile {
    fn on_spawn(&mut self) {
        self.pos = Vec2::ZERO;
        self.dir = Vec2::ZERO;
        self.live = false;
    }

    fn on_despawn(&mut self) {
        self.live = false;
    }
}
