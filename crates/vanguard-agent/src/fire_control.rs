//! Fire-control engine: threat scoring, shooter-to-target assignment, and
//! coordination tactics (focus fire, stagger fire).

use std::cmp::Ordering;
use std::collections::HashMap;

use vanguard_core::constants::RECENT_FIRE_WINDOW_MS;
use vanguard_core::decision::{FireDecision, TargetAssignment, ThreatEstimate};
use vanguard_core::entity::{BattlefieldSnapshot, EntityState, WeaponState};
use vanguard_core::enums::{EventType, FireTactic, UnitType};

use crate::memory::EventMemory;

const SINGLE_SHOT_RATIONALE: &str = "当前配置下可获得最高威胁压制收益";
const FOCUS_FIRE_RATIONALE: &str = "最高威胁超过阈值，集中火力压制";

/// Seconds between consecutive staggered shots.
const STAGGER_STEP_S: f64 = 1.25;

#[derive(Debug, Clone)]
pub struct FireControlConfig {
    pub enable_focus_fire: bool,
    pub enable_stagger_fire: bool,
    pub max_shooters_per_target: usize,
    pub focus_fire_threat_threshold: f64,
}

impl Default for FireControlConfig {
    fn default() -> Self {
        Self {
            enable_focus_fire: true,
            enable_stagger_fire: true,
            max_shooters_per_target: 2,
            focus_fire_threat_threshold: 78.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct FireControlEngine {
    config: FireControlConfig,
}

impl FireControlEngine {
    pub fn new(config: FireControlConfig) -> Self {
        Self { config }
    }

    /// Produce the fire decision for one snapshot. Total: degraded input
    /// yields an empty decision, never an error.
    pub fn decide(&self, snapshot: &BattlefieldSnapshot, memory: &EventMemory) -> FireDecision {
        let live_hostiles: Vec<&EntityState> =
            snapshot.hostile_units.iter().filter(|t| t.alive).collect();

        let threats = rank_threats(snapshot, &live_hostiles);
        let index_by_target: HashMap<&str, f64> = threats
            .iter()
            .map(|t| (t.target_id.as_str(), t.index))
            .collect();

        let mut assignments = self.assign_shooters(snapshot, &live_hostiles, &index_by_target);
        if self.config.enable_focus_fire {
            self.apply_focus_fire(snapshot, &live_hostiles, &threats, &mut assignments);
        }
        if self.config.enable_stagger_fire {
            apply_stagger_fire(&mut assignments);
        }

        let top_threat = threats
            .first()
            .map(|t| t.target_id.as_str())
            .unwrap_or("无");
        let recent_fire = memory
            .last_event_by_type(
                EventType::WeaponFire,
                snapshot.timestamp_ms,
                RECENT_FIRE_WINDOW_MS,
            )
            .is_some();
        let summary = format!(
            "火力分配数={}，最高威胁={}，近期火力记忆={}",
            assignments.len(),
            top_threat,
            if recent_fire { "有" } else { "无" }
        );

        FireDecision {
            threats,
            assignments,
            summary,
        }
    }

    /// One assignment per live armed shooter: the (target, weapon) pair
    /// maximizing fit × threat index. First-seen wins ties.
    fn assign_shooters(
        &self,
        snapshot: &BattlefieldSnapshot,
        live_hostiles: &[&EntityState],
        index_by_target: &HashMap<&str, f64>,
    ) -> Vec<TargetAssignment> {
        let mut assignments = Vec::new();

        for shooter in snapshot.friendly_units.iter().filter(|s| s.alive) {
            if shooter.weapons.is_empty() {
                continue;
            }

            let mut best: Option<(usize, &EntityState, f64)> = None;
            for &target in live_hostiles {
                let threat_index = index_by_target[target.id.as_str()];
                for (weapon_idx, weapon) in shooter.weapons.iter().enumerate() {
                    let fit = weapon_fit_score(weapon, shooter, target);
                    if fit <= 0.0 {
                        continue;
                    }
                    let score = fit * threat_index;
                    if best.map_or(true, |(_, _, b)| score > b) {
                        best = Some((weapon_idx, target, score));
                    }
                }
            }

            if let Some((weapon_idx, target, score)) = best {
                let weapon = &shooter.weapons[weapon_idx];
                assignments.push(TargetAssignment {
                    shooter_id: shooter.id.clone(),
                    target_id: target.id.clone(),
                    weapon_name: weapon.name.clone(),
                    score,
                    expected_kill_prob: weapon.kill_probability,
                    scheduled_offset_s: 0.0,
                    tactic: FireTactic::SingleShot,
                    rationale: SINGLE_SHOT_RATIONALE.to_string(),
                });
            }
        }

        assignments
    }

    /// Concentrate shooters on the top threat when its index clears the
    /// configured threshold.
    fn apply_focus_fire(
        &self,
        snapshot: &BattlefieldSnapshot,
        live_hostiles: &[&EntityState],
        threats: &[ThreatEstimate],
        assignments: &mut [TargetAssignment],
    ) {
        let Some(top) = threats.first() else {
            return;
        };
        if top.index < self.config.focus_fire_threat_threshold {
            return;
        }

        let mut assigned_to_top = 0usize;
        for assignment in assignments.iter_mut() {
            if assignment.target_id == top.target_id {
                assignment.tactic = FireTactic::FocusFire;
                assignment.rationale = FOCUS_FIRE_RATIONALE.to_string();
                assigned_to_top += 1;
            }
        }

        let Some(top_entity) = live_hostiles.iter().copied().find(|t| t.id == top.target_id)
        else {
            return;
        };

        for assignment in assignments.iter_mut() {
            if assigned_to_top >= self.config.max_shooters_per_target {
                break;
            }
            if assignment.target_id == top.target_id {
                continue;
            }
            let Some(shooter) = snapshot
                .friendly_units
                .iter()
                .find(|s| s.id == assignment.shooter_id)
            else {
                continue;
            };

            let mut best: Option<(usize, f64)> = None;
            for (weapon_idx, weapon) in shooter.weapons.iter().enumerate() {
                let fit = weapon_fit_score(weapon, shooter, top_entity);
                if fit <= 0.0 {
                    continue;
                }
                if best.map_or(true, |(_, b)| fit > b) {
                    best = Some((weapon_idx, fit));
                }
            }
            let Some((weapon_idx, fit)) = best else {
                continue;
            };

            let weapon = &shooter.weapons[weapon_idx];
            assignment.target_id = top.target_id.clone();
            assignment.weapon_name = weapon.name.clone();
            assignment.score = fit * top.index;
            assignment.expected_kill_prob = weapon.kill_probability;
            assignment.tactic = FireTactic::FocusFire;
            assignment.rationale = FOCUS_FIRE_RATIONALE.to_string();
            assigned_to_top += 1;
        }
    }
}

/// Threat estimates for all live hostiles, highest index first.
fn rank_threats(
    snapshot: &BattlefieldSnapshot,
    live_hostiles: &[&EntityState],
) -> Vec<ThreatEstimate> {
    let mut threats: Vec<ThreatEstimate> = live_hostiles
        .iter()
        .map(|&target| {
            let min_distance = snapshot
                .friendly_units
                .iter()
                .filter(|f| f.alive)
                .map(|f| f.pose.distance_to(&target.pose))
                .fold(f64::INFINITY, f64::min);
            ThreatEstimate {
                target_id: target.id.clone(),
                index: threat_index(target, min_distance),
                reason: format!(
                    "距我方最近约{:.0}米，速度{:.1}m/s",
                    min_distance.min(1e9),
                    target.speed_mps
                ),
            }
        })
        .collect();

    // Stable sort keeps first-seen order among equal indices.
    threats.sort_by(|a, b| b.index.partial_cmp(&a.index).unwrap_or(Ordering::Equal));
    threats
}

/// Dimensionless threat index combining unit type, proximity, speed, and
/// declared threat level.
fn threat_index(target: &EntityState, min_distance_m: f64) -> f64 {
    let proximity = if min_distance_m.is_finite() {
        1000.0 / (1.0 + min_distance_m)
    } else {
        0.0
    };
    0.50 * type_threat_weight(target.unit_type)
        + 0.25 * proximity
        + 1.2 * target.speed_mps.min(20.0)
        + 25.0 * target.threat_level.clamp(0.0, 1.0)
}

fn type_threat_weight(unit_type: UnitType) -> f64 {
    match unit_type {
        UnitType::Armor => 95.0,
        UnitType::Artillery => 92.0,
        UnitType::Command => 88.0,
        UnitType::AirDefense => 80.0,
        UnitType::Infantry => 55.0,
        UnitType::Unknown => 40.0,
    }
}

/// How appropriate a weapon is against a target right now. Negative means
/// ineligible (out of ammo, cooling down, or out of range).
fn weapon_fit_score(weapon: &WeaponState, shooter: &EntityState, target: &EntityState) -> f64 {
    if weapon.ammo == 0 || weapon.ready_in_s > 0.0 {
        return -1.0;
    }
    let distance = shooter.pose.distance_to(&target.pose);
    if weapon.range_m <= 0.0 || distance > weapon.range_m {
        return -1.0;
    }

    let range_factor = 1.0 - 0.6 * (distance / weapon.range_m);
    let preference = if weapon.prefers(target.unit_type) {
        1.15
    } else {
        0.85
    };
    let quality = weapon.kill_probability.clamp(0.0, 1.0);
    (range_factor * preference * (0.6 + quality)).max(0.0)
}

/// Spread shot times across assignments ranked by score.
fn apply_stagger_fire(assignments: &mut [TargetAssignment]) {
    assignments.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    for (rank, assignment) in assignments.iter_mut().enumerate() {
        assignment.scheduled_offset_s = STAGGER_STEP_S * rank as f64;
        if assignment.tactic == FireTactic::SingleShot {
            assignment.tactic = FireTactic::StaggerFire;
        }
    }
}
