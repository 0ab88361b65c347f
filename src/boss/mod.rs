//! Boss lifecycle: states, timelines per state, the machine that runs
//! them and the profiles that flavor it

pub mod catalog;
pub mod events;
pub mod machine;
pub mod profile;
pub mod profiles;
pub mod state;

pub use catalog::TimelineCatalog;
pub use events::{EncounterEvent, EncounterEventKind, EncounterLog};
pub use machine::{BossBody, BossMachine};
pub use profile::{BossProfile, DefaultProfile};
pub use profiles::{
    profile_by_name, DemonBladeProfile, FirewallProfile, Hitbox, NullShardProfile, WardenProfile,
};
pub use state::{BossPhase, BossState, Mode, MAX_ATTACK_ARMS};
