//! Entity, weapon, and battlefield snapshot state.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VISIBILITY_M;
use crate::enums::{Side, UnitType};
use crate::types::Pose;

/// A weapon carried by an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    pub name: String,
    /// Maximum effective range (meters).
    pub range_m: f64,
    /// Single-shot kill probability, clamped into [0, 1] on use.
    pub kill_probability: f64,
    /// Remaining rounds.
    pub ammo: u32,
    /// Cooldown countdown; ready when it reaches zero (seconds).
    pub ready_in_s: f64,
    /// Target types this weapon is tuned for. Empty means unrestricted.
    pub preferred_targets: Vec<UnitType>,
}

impl WeaponState {
    /// Whether the weapon can fire right now.
    pub fn is_ready(&self) -> bool {
        self.ammo > 0 && self.ready_in_s <= 0.0
    }

    /// Whether the weapon prefers the given target type.
    pub fn prefers(&self, target: UnitType) -> bool {
        self.preferred_targets.is_empty() || self.preferred_targets.contains(&target)
    }
}

/// One simulation entity as known to the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub id: String,
    pub side: Side,
    pub unit_type: UnitType,
    pub pose: Pose,
    pub speed_mps: f64,
    pub heading_deg: f64,
    /// Declared threat, in [0, 1].
    pub threat_level: f64,
    pub alive: bool,
    pub formation_group: Option<String>,
    pub weapons: Vec<WeaponState>,
}

/// Environment conditions attached to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub visibility_m: f64,
    pub weather_risk: f64,
    pub terrain_risk: f64,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self {
            visibility_m: DEFAULT_VISIBILITY_M,
            weather_risk: 0.0,
            terrain_risk: 0.0,
        }
    }
}

/// A pure-data view of the battlefield at one timestamp.
///
/// Snapshots are value copies; nothing mutates them after emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattlefieldSnapshot {
    pub timestamp_ms: i64,
    pub friendly_units: Vec<EntityState>,
    pub hostile_units: Vec<EntityState>,
    pub env: EnvironmentState,
}
