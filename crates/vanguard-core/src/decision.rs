//! Decision records emitted by the fire-control and maneuver engines.

use serde::{Deserialize, Serialize};

use crate::enums::{FireTactic, FormationMode, ManeuverKind, TagName};
use crate::types::Pose;

/// A qualitative judgment produced by situation fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalTag {
    pub name: TagName,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub reason: String,
}

/// The fused tactical reading of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SituationSemantics {
    pub tags: Vec<TacticalTag>,
}

impl SituationSemantics {
    pub fn has_tag(&self, name: TagName) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }
}

/// Threat score for one hostile target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatEstimate {
    pub target_id: String,
    /// Dimensionless non-negative threat index.
    pub index: f64,
    pub reason: String,
}

/// One shooter-to-target assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAssignment {
    pub shooter_id: String,
    pub target_id: String,
    pub weapon_name: String,
    pub score: f64,
    pub expected_kill_prob: f64,
    /// Fire time offset assigned by stagger scheduling (seconds).
    pub scheduled_offset_s: f64,
    pub tactic: FireTactic,
    pub rationale: String,
}

/// Fire-control output for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FireDecision {
    pub threats: Vec<ThreatEstimate>,
    pub assignments: Vec<TargetAssignment>,
    pub summary: String,
}

/// One maneuver order for a friendly unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverAction {
    pub unit_id: String,
    pub action: ManeuverKind,
    /// Planned waypoints, starting at the unit's current pose.
    pub path: Vec<Pose>,
    /// Last element of `path`.
    pub next_pose: Pose,
    pub rationale: String,
}

/// Maneuver output for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManeuverDecision {
    pub actions: Vec<ManeuverAction>,
    pub formation_mode: FormationMode,
    pub summary: String,
}

/// The full per-tick decision package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionPackage {
    pub fire: FireDecision,
    pub maneuver: ManeuverDecision,
    pub explanation: String,
    pub from_cache: bool,
}
