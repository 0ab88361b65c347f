//! Pooled effect bursts
//!
//! A burst is a one-shot hazard (lightning bolt, sword wave) that plays
//! its own strike timeline where it lands. A "damage" frame event marks
//! the dangerous moment; the session resolves it against the target.
//! Completion releases the burst back to its pool. An optional start
//! delay lets sweep patterns pre-place a row of bursts that detonate in
//! sequence.

use std::sync::Arc;

use crate::core::types::Vec2;
use crate::pool::PoolItem;
use crate::timeline::{Timeline, TimelineEvent, TimelinePlayer};

/// Frame event name that triggers the burst's hit test
pub const DAMAGE_EVENT: &str = "damage";

/// Strike parameters shared by every burst of one kind
#[derive(Debug, Clone)]
pub struct BurstSpec {
    pub timeline: Arc<Timeline>,
    pub damage: i32,
    pub hit_radius: f32,
}

impl BurstSpec {
    pub fn new(timeline: Timeline, damage: i32, hit_radius: f32) -> Self {
        Self {
            timeline: Arc::new(timeline),
            damage,
            hit_radius,
        }
    }
}

/// Area hit attempt surfaced by a burst tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstStrike {
    pub center: Vec2,
    pub radius: f32,
    pub damage: i32,
}

/// What a burst reported this tick
#[derive(Debug, Clone, Copy, Default)]
pub struct BurstTick {
    pub strike: Option<BurstStrike>,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct EffectBurst {
    pub pos: Vec2,
    player: TimelinePlayer,
    pending: Option<Arc<Timeline>>,
    damage: i32,
    hit_radius: f32,
    start_delay: f32,
    live: bool,
}

impl EffectBurst {
    /// Pool prototype; inert until armed
    pub fn inert() -> Self {
        Self {
            pos: Vec2::ZERO,
            player: TimelinePlayer::new(),
            pending: None,
            damage: 0,
            hit_radius: 0.0,
            start_delay: 0.0,
            live: false,
        }
    }

    /// Places the burst and starts (or delays) its strike timeline.
    /// Strikes land on frame advancement, so the dangerous frame must
    /// come after an authored warn frame.
    pub fn arm(&mut self, spec: &BurstSpec, pos: Vec2, start_delay: f32) {
        self.pos = pos;
        self.damage = spec.damage;
        self.hit_radius = spec.hit_radius;
        self.start_delay = start_delay.max(0.0);
        self.live = true;
        self.player.reset_visual();
        if self.start_delay > 0.0 {
            self.pending = Some(spec.timeline.clone());
        } else {
            self.pending = None;
            self.player.play(spec.timeline.clone(), true);
        }
    }

    /// Advances the strike timeline by one tick
    pub fn advance(&mut self, dt: f32) -> BurstTick {
        let mut tick = BurstTick::default();

        if !self.live {
            tick.finished = true;
            return tick;
        }

        if self.start_delay > 0.0 {
            self.start_delay -= dt;
            if self.start_delay <= 0.0 {
                self.start_delay = 0.0;
                if let Some(timeline) = self.pending.take() {
                    self.player.play(timeline, true);
                }
            }
            return tick;
        }

        let mut events = Vec::new();
        self.player.advance(dt, &mut events);
        self.collect(&events, &mut tick);
        tick
    }

    fn collect(&mut self, events: &[TimelineEvent], tick: &mut BurstTick) {
        for event in events {
            match event {
                TimelineEvent::Frame(name) if name == DAMAGE_EVENT => {
                    tick.strike = Some(BurstStrike {
                        center: self.pos,
                        radius: self.hit_radius,
                        damage: self.damage,
                    });
                }
                TimelineEvent::Completed => {
                    self.live = false;
                    tick.finished = true;
                }
                TimelineEvent::Frame(_) => {}
            }
        }
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn visual(&self) -> &crate::timeline::Visual {
        self.player.visual()
    }
}

impl PoolItem for EffectBurst {
    fn on_spawn(&mut self) {
        self.pos = Vec2::ZERO;
        self.start_delay = 0.0;
        self.live = false;
        self.pending = None;
        self.player.stop();
        self.player.reset_visual();
    }

    fn on_despawn(&mut self) {
        self.live = false;
        self.pending = None;
        self.player.stop();
    }
}
