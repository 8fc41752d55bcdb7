//! Enumeration types used throughout the decision agent.

use serde::{Deserialize, Serialize};

/// Force affiliation of a simulation entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Friendly,
    Hostile,
    #[default]
    Neutral,
}

/// Coarse unit category derived from the DIS entity type record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Infantry,
    Armor,
    Artillery,
    AirDefense,
    Command,
    #[default]
    Unknown,
}

/// Category of a tactical event record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    WeaponFire,
    SensorContact,
    TacticalTag,
    UnitLoss,
    #[default]
    Unknown,
}

impl EventType {
    /// Operator-facing label used when rendering memory context lines.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::WeaponFire => "武器开火",
            EventType::SensorContact => "传感器接触",
            EventType::TacticalTag => "战术标记",
            EventType::UnitLoss => "单位损失",
            EventType::Unknown => "未知事件",
        }
    }
}

/// Closed vocabulary of situation-fusion tags.
///
/// Kept as an enumeration so downstream engines dispatch by value instead
/// of comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagName {
    InsufficientContact,
    LeftFlankExposed,
    EnemyArmorClusterApproaching,
    LowVisibility,
    RecentEnemyArtilleryActivity,
    StableContact,
}

impl TagName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagName::InsufficientContact => "insufficient_contact",
            TagName::LeftFlankExposed => "left_flank_exposed",
            TagName::EnemyArmorClusterApproaching => "enemy_armor_cluster_approaching",
            TagName::LowVisibility => "low_visibility",
            TagName::RecentEnemyArtilleryActivity => "recent_enemy_artillery_activity",
            TagName::StableContact => "stable_contact",
        }
    }
}

/// Fire coordination tactic attached to a target assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireTactic {
    #[default]
    SingleShot,
    FocusFire,
    StaggerFire,
}

/// Maneuver action selected for a friendly unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverKind {
    EmergencyEvasion,
    FlankReinforce,
    OccupyAdvantageousTerrain,
    AdvanceBound,
}

impl ManeuverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManeuverKind::EmergencyEvasion => "emergency_evasion",
            ManeuverKind::FlankReinforce => "flank_reinforce",
            ManeuverKind::OccupyAdvantageousTerrain => "occupy_advantageous_terrain",
            ManeuverKind::AdvanceBound => "advance_bound",
        }
    }
}

/// Coarse formation posture for the friendly force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationMode {
    #[default]
    Assemble,
    Disperse,
}
