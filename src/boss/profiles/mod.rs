//! Shipped boss profiles

pub mod demon_blade;
pub mod firewall;
pub mod null_shard;
pub mod warden;

pub use demon_blade::{DemonBladeProfile, Hitbox};
pub use firewall::FirewallProfile;
pub use null_shard::NullShardProfile;
pub use warden::WardenProfile;

use crate::boss::profile::{BossProfile, DefaultProfile};

/// Resolves a profile name from an encounter definition. Unknown names
/// are a configuration error the caller reports.
pub fn profile_by_name(name: &str) -> Option<Box<dyn BossProfile>> {
    match name {
        "demon_blade" => Some(Box::new(DemonBladeProfile::with_defaults())),
        "warden" => Some(Box::new(WardenProfile::with_defaults())),
        "null_shard" => Some(Box::new(NullShardProfile::with_defaults())),
        "firewall" => Some(Box::new(FirewallProfile::with_defaults())),
        "default" | "" => Some(Box::new(DefaultProfile)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_names_resolve() {
        for name in ["demon_blade", "warden", "null_shard", "firewall", "default", ""] {
            assert!(profile_by_name(name).is_some());
        }
        assert!(profile_by_name("unheard_of").is_none());
    }
}
