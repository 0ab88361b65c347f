//! Cursor Reboot - Boss Encounter Core

pub mod boss;
pub mod core;
pub mod data;
pub mod pattern;
pub mod pool;
pub mod scheduler;
pub mod session;
pub mod spawnable;
pub mod timeline;
