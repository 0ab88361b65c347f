//! Frame-sequenced timeline playback
//!
//! One player drives one visual: it steps through a timeline's frames on
//! the cooperative tick, emits named frame events as playback advances
//! into frames, runs per-frame scale/rotation tweens, and fades the
//! visual out after a non-looping timeline completes. Frame advancement
//! scales with `playback_speed`; tweens and fades run on wall-clock dt so
//! a slowed boss still settles its visuals at the authored rate.

use std::sync::Arc;

use crate::core::types::lerp_angle;
use crate::timeline::frame::{SpriteRef, Timeline, TweenSpec};

/// Occurrences surfaced by the player during `advance`
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// Playback entered a frame carrying a named event
    Frame(String),
    /// A non-looping timeline finished; emitted once per play
    Completed,
}

/// Render-facing state callers read after each tick
#[derive(Debug, Clone)]
pub struct Visual {
    pub sprite: SpriteRef,
    pub scale: f32,
    pub rotation_z: f32,
    pub alpha: f32,
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            sprite: SpriteRef::default(),
            scale: 1.0,
            rotation_z: 0.0,
            alpha: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Interp {
    Linear,
    Angular,
}

/// A single tweened value (scale or rotation)
#[derive(Debug, Clone)]
struct Channel {
    value: f32,
    interp: Interp,
    tween: Option<Tween>,
}

#[derive(Debug, Clone)]
struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Channel {
    fn new(value: f32, interp: Interp) -> Self {
        Self { value, interp, tween: None }
    }

    fn apply(&mut self, spec: TweenSpec) {
        if spec.duration > 0.0 {
            self.tween = Some(Tween {
                from: self.value,
                to: spec.target,
                duration: spec.duration,
                elapsed: 0.0,
            });
        } else {
            self.value = spec.target;
            self.tween = None;
        }
    }

    fn reset(&mut self, value: f32) {
        self.value = value;
        self.tween = None;
    }

    fn advance(&mut self, dt: f32) {
        let Some(tween) = &mut self.tween else {
            return;
        };
        tween.elapsed += dt;
        let t = (tween.elapsed / tween.duration).clamp(0.0, 1.0);
        self.value = match self.interp {
            Interp::Linear => tween.from + (tween.to - tween.from) * t,
            Interp::Angular => lerp_angle(tween.from, tween.to, t),
        };
        if tween.elapsed >= tween.duration {
            self.value = tween.to;
            self.tween = None;
        }
    }
}

#[derive(Debug, Clone)]
struct Fade {
    duration: f32,
    elapsed: f32,
}

/// Plays one timeline at a time, advancing at most one frame per tick
#[derive(Debug, Clone)]
pub struct TimelinePlayer {
    timeline: Option<Arc<Timeline>>,
    frame: usize,
    timer: f32,
    playback_speed: f32,
    playing: bool,
    paused: bool,
    completed: bool,
    scale: Channel,
    rotation: Channel,
    fade: Option<Fade>,
    visual: Visual,
}

impl Default for TimelinePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelinePlayer {
    pub fn new() -> Self {
        Self {
            timeline: None,
            frame: 0,
            timer: 0.0,
            playback_speed: 1.0,
            playing: false,
            paused: false,
            completed: false,
            scale: Channel::new(1.0, Interp::Linear),
            rotation: Channel::new(0.0, Interp::Angular),
            fade: None,
            visual: Visual::default(),
        }
    }

    /// Starts a timeline from frame 0, applying frame 0's visuals
    /// immediately. Frame events only fire when `advance` moves playback
    /// into a frame, so frame 0's event waits for a loop wrap.
    ///
    /// Rejected (returns false, state untouched) when the current
    /// timeline is still playing, is not interruptible, and `force` is
    /// not set.
    pub fn play(&mut self, timeline: Arc<Timeline>, force: bool) -> bool {
        if self.playing && !force {
            if let Some(current) = &self.timeline {
                if !current.interruptible {
                    return false;
                }
            }
        }

        self.frame = 0;
        self.timer = 0.0;
        self.completed = false;
        self.fade = None;
        self.visual.alpha = 1.0;

        if timeline.frames.is_empty() {
            // Nothing to play; keep the last visual, go idle
            self.timeline = Some(timeline);
            self.playing = false;
            return true;
        }

        self.playing = true;
        self.timeline = Some(timeline.clone());
        self.apply_frame_visuals(&timeline, 0);
        self.sync_visual();
        true
    }

    /// Advances playback by one tick
    ///
    /// Tweens and any fade-out always advance; the frame index advances
    /// only while playing with a positive playback speed, and by at most
    /// one frame per call. Playback speed at or below zero behaves as
    /// paused, never as reverse.
    pub fn advance(&mut self, dt: f32, events: &mut Vec<TimelineEvent>) {
        self.scale.advance(dt);
        self.rotation.advance(dt);
        self.advance_fade(dt);

        if !self.playing || self.paused || self.playback_speed <= 0.0 {
            self.sync_visual();
            return;
        }

        let Some(timeline) = self.timeline.clone() else {
            self.sync_visual();
            return;
        };

        self.timer += dt * self.playback_speed;
        let duration = timeline.frames[self.frame].duration;
        if self.timer >= duration {
            self.timer = 0.0;
            let next = self.frame + 1;
            if next < timeline.frames.len() {
                self.enter_frame(&timeline, next, events);
            } else if timeline.looping {
                self.enter_frame(&timeline, 0, events);
            } else {
                self.playing = false;
                if !self.completed {
                    self.completed = true;
                    events.push(TimelineEvent::Completed);
                    if let Some(duration) = timeline.fade_out {
                        self.fade = Some(Fade { duration, elapsed: 0.0 });
                    }
                }
            }
        }

        self.sync_visual();
    }

    fn enter_frame(&mut self, timeline: &Timeline, index: usize, events: &mut Vec<TimelineEvent>) {
        self.frame = index;
        let frame = &timeline.frames[index];
        if let Some(event) = &frame.event {
            if !event.is_empty() {
                events.push(TimelineEvent::Frame(event.clone()));
            }
        }
        self.apply_frame_visuals(timeline, index);
    }

    fn apply_frame_visuals(&mut self, timeline: &Timeline, index: usize) {
        let frame = &timeline.frames[index];
        self.visual.sprite = frame.sprite.clone();
        if let Some(spec) = frame.scale {
            self.scale.apply(spec);
        }
        if let Some(spec) = frame.rotation_z {
            self.rotation.apply(spec);
        }
    }

    fn advance_fade(&mut self, dt: f32) {
        let Some(fade) = &mut self.fade else {
            return;
        };
        fade.elapsed += dt;
        if fade.duration <= 0.0 || fade.elapsed >= fade.duration {
            self.visual.alpha = 0.0;
            self.fade = None;
        } else {
            self.visual.alpha = 1.0 - fade.elapsed / fade.duration;
        }
    }

    fn sync_visual(&mut self) {
        self.visual.scale = self.scale.value;
        self.visual.rotation_z = self.rotation.value;
    }

    /// Clears playback entirely, e.g. when the owning entity despawns
    pub fn stop(&mut self) {
        self.timeline = None;
        self.playing = false;
        self.frame = 0;
        self.timer = 0.0;
        self.fade = None;
    }

    /// Resets transient visual state for a reused entity
    pub fn reset_visual(&mut self) {
        self.scale.reset(1.0);
        self.rotation.reset(0.0);
        self.visual = Visual::default();
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn playback_speed(&self) -> f32 {
        self.playback_speed
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        self.playback_speed = speed;
    }

    pub fn visual(&self) -> &Visual {
        &self.visual
    }

    pub fn current_timeline(&self) -> Option<&Arc<Timeline>> {
        self.timeline.as_ref()
    }

    /// Whether an unforced play request would currently be rejected
    pub fn is_locked(&self) -> bool {
        self.playing
            && self
                .timeline
                .as_ref()
                .map(|t| !t.interruptible)
                .unwrap_or(false)
    }
}
