//! Authored timeline data
//!
//! A timeline is an ordered list of frames, each holding a sprite, a hold
//! duration, an optional named event, and optional scale/rotation targets.
//! Timelines are plain data: authored in encounter definition files or
//! built in code, then shared immutably with every player that runs them.

use serde::{Deserialize, Serialize};

/// Reference to a sprite asset by name
///
/// The core never touches image data; a renderer resolves the name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRef(pub String);

impl SpriteRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Interpolation target installed when a frame is entered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    pub target: f32,
    /// Seconds to reach the target from the current value; zero snaps
    #[serde(default)]
    pub duration: f32,
}

impl TweenSpec {
    pub fn snap(target: f32) -> Self {
        Self { target, duration: 0.0 }
    }

    pub fn over(target: f32, duration: f32) -> Self {
        Self { target, duration }
    }
}

/// One frame of a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineFrame {
    pub sprite: SpriteRef,
    /// Seconds this frame holds before playback advances
    pub duration: f32,
    /// Named event emitted when playback enters this frame
    #[serde(default)]
    pub event: Option<String>,
    /// Uniform scale target for this frame
    #[serde(default)]
    pub scale: Option<TweenSpec>,
    /// Z-rotation target in degrees for this frame
    #[serde(default)]
    pub rotation_z: Option<TweenSpec>,
}

impl TimelineFrame {
    pub fn new(sprite: impl Into<String>, duration: f32) -> Self {
        Self {
            sprite: SpriteRef::new(sprite),
            duration,
            event: None,
            scale: None,
            rotation_z: None,
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_scale(mut self, spec: TweenSpec) -> Self {
        self.scale = Some(spec);
        self
    }

    pub fn with_rotation(mut self, spec: TweenSpec) -> Self {
        self.rotation_z = Some(spec);
        self
    }
}

/// An authored frame sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub name: String,
    pub frames: Vec<TimelineFrame>,
    /// Wrap to frame 0 past the end instead of completing
    #[serde(default)]
    pub looping: bool,
    /// Whether an unforced play request may cut this timeline short
    #[serde(default = "default_interruptible")]
    pub interruptible: bool,
    /// Alpha fade-out duration applied after completion, if any
    #[serde(default)]
    pub fade_out: Option<f32>,
}

fn default_interruptible() -> bool {
    true
}

impl Timeline {
    pub fn new(name: impl Into<String>, frames: Vec<TimelineFrame>) -> Self {
        Self {
            name: name.into(),
            frames,
            looping: false,
            interruptible: true,
            fade_out: None,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn uninterruptible(mut self) -> Self {
        self.interruptible = false;
        self
    }

    pub fn with_fade_out(mut self, duration: f32) -> Self {
        self.fade_out = Some(duration);
        self
    }

    /// Total authored duration of one pass over the frames
    pub fn pass_duration(&self) -> f32 {
        self.frames.iter().map(|f| f.duration).sum()
    }
}
