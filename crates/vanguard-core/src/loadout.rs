//! Default weapon loadouts per unit type.
//!
//! The adapter provisions exactly one of these when an entity arrives
//! without any weapon report of its own.

use crate::entity::WeaponState;
use crate::enums::UnitType;

/// Build the default loadout for a unit type.
pub fn default_loadout(unit_type: UnitType) -> Vec<WeaponState> {
    let weapon = match unit_type {
        UnitType::Infantry => WeaponState {
            name: "rifle".to_string(),
            range_m: 800.0,
            kill_probability: 0.25,
            ammo: 200,
            ready_in_s: 0.0,
            preferred_targets: vec![UnitType::Infantry],
        },
        UnitType::Armor => WeaponState {
            name: "tank_gun".to_string(),
            range_m: 2500.0,
            kill_probability: 0.65,
            ammo: 30,
            ready_in_s: 0.0,
            preferred_targets: vec![UnitType::Armor, UnitType::Artillery, UnitType::Command],
        },
        UnitType::Artillery => WeaponState {
            name: "howitzer".to_string(),
            range_m: 8000.0,
            kill_probability: 0.55,
            ammo: 20,
            ready_in_s: 0.0,
            preferred_targets: vec![UnitType::Armor, UnitType::Artillery, UnitType::Command],
        },
        UnitType::AirDefense => WeaponState {
            name: "sam".to_string(),
            range_m: 3500.0,
            kill_probability: 0.60,
            ammo: 12,
            ready_in_s: 0.0,
            preferred_targets: vec![UnitType::AirDefense],
        },
        UnitType::Command | UnitType::Unknown => WeaponState {
            name: "generic".to_string(),
            range_m: 1000.0,
            kill_probability: 0.20,
            ammo: 50,
            ready_in_s: 0.0,
            // Empty preference set means unrestricted.
            preferred_targets: Vec::new(),
        },
    };
    vec![weapon]
}
