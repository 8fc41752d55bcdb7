//! Maneuver engine: formation mode selection and cost-field path planning.

use vanguard_core::decision::{ManeuverAction, ManeuverDecision, SituationSemantics};
use vanguard_core::entity::BattlefieldSnapshot;
use vanguard_core::enums::{FormationMode, ManeuverKind, TagName, UnitType};
use vanguard_core::types::Pose;

const EMERGENCY_RATIONALE: &str = "近距威胁触发紧急规避";
const FLANK_RATIONALE: &str = "增援暴露左翼";
const TERRAIN_RATIONALE: &str = "抢占有利地形应对装甲集群";
const ADVANCE_RATIONALE: &str = "保持接触推进";

/// Unit steps for the 4 cardinals and 4 diagonals (diagonals at 0.7).
const NEIGHBOR_DIRS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (0.7, 0.7),
    (0.7, -0.7),
    (-0.7, 0.7),
    (-0.7, -0.7),
];

#[derive(Debug, Clone)]
pub struct ManeuverConfig {
    pub emergency_distance_m: f64,
    pub path_step_m: f64,
    pub path_horizon_steps: usize,
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            emergency_distance_m: 450.0,
            path_step_m: 80.0,
            path_horizon_steps: 8,
        }
    }
}

#[derive(Debug, Default)]
pub struct ManeuverEngine {
    config: ManeuverConfig,
}

impl ManeuverEngine {
    pub fn new(config: ManeuverConfig) -> Self {
        Self { config }
    }

    /// Produce the maneuver decision for one snapshot.
    pub fn decide(
        &self,
        snapshot: &BattlefieldSnapshot,
        semantics: &SituationSemantics,
    ) -> ManeuverDecision {
        if snapshot.friendly_units.is_empty() {
            return ManeuverDecision {
                actions: Vec::new(),
                formation_mode: FormationMode::default(),
                summary: "机动动作数=0".to_string(),
            };
        }

        let formation_mode = if semantics.has_tag(TagName::LeftFlankExposed)
            || semantics.has_tag(TagName::RecentEnemyArtilleryActivity)
        {
            FormationMode::Disperse
        } else {
            FormationMode::Assemble
        };

        let centroid = friendly_centroid(snapshot);

        let mut actions = Vec::new();
        for unit in snapshot.friendly_units.iter().filter(|u| u.alive) {
            let nearest = snapshot
                .hostile_units
                .iter()
                .map(|enemy| (enemy, unit.pose.distance_to(&enemy.pose)))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            if let Some((enemy, distance)) = nearest {
                if distance < self.config.emergency_distance_m {
                    let next_pose =
                        move_away(&unit.pose, &enemy.pose, 1.5 * self.config.path_step_m);
                    actions.push(ManeuverAction {
                        unit_id: unit.id.clone(),
                        action: ManeuverKind::EmergencyEvasion,
                        path: vec![unit.pose, next_pose],
                        next_pose,
                        rationale: EMERGENCY_RATIONALE.to_string(),
                    });
                    continue;
                }
            }

            let (action, offset, rationale) = if semantics.has_tag(TagName::LeftFlankExposed) {
                (ManeuverKind::FlankReinforce, (-220.0, 80.0), FLANK_RATIONALE)
            } else if semantics.has_tag(TagName::EnemyArmorClusterApproaching) {
                (
                    ManeuverKind::OccupyAdvantageousTerrain,
                    (60.0, 200.0),
                    TERRAIN_RATIONALE,
                )
            } else {
                (ManeuverKind::AdvanceBound, (0.0, 160.0), ADVANCE_RATIONALE)
            };

            let raw_goal = Pose::new(
                unit.pose.x + offset.0,
                unit.pose.y + offset.1,
                unit.pose.z,
            );
            let goal = blend_goal(&raw_goal, &unit.pose, &centroid, formation_mode);

            let path = self.plan_path(&unit.pose, &goal, snapshot);
            let next_pose = path.last().copied().unwrap_or(goal);
            actions.push(ManeuverAction {
                unit_id: unit.id.clone(),
                action,
                path,
                next_pose,
                rationale: rationale.to_string(),
            });
        }

        let summary = format!("机动动作数={}", actions.len());
        ManeuverDecision {
            actions,
            formation_mode,
            summary,
        }
    }

    /// Greedy cost-field descent toward the goal. The returned path starts
    /// at `start` and holds at most `path_horizon_steps + 2` poses.
    fn plan_path(&self, start: &Pose, goal: &Pose, snapshot: &BattlefieldSnapshot) -> Vec<Pose> {
        let step = self.config.path_step_m;
        let mut path = vec![*start];
        let mut current = *start;

        for _ in 0..self.config.path_horizon_steps {
            if current.distance_to(goal) <= step {
                break;
            }

            let mut best: Option<(Pose, f64)> = None;
            for (dx, dy) in NEIGHBOR_DIRS {
                let candidate = Pose::new(current.x + dx * step, current.y + dy * step, current.z);
                let cost = 0.8 * candidate.distance_to(goal)
                    + 35.0 * threat_field(&candidate, snapshot)
                    + 0.2 * candidate.distance_to(&current);
                if best.map_or(true, |(_, b)| cost < b) {
                    best = Some((candidate, cost));
                }
            }

            if let Some((next, _)) = best {
                path.push(next);
                current = next;
            }
        }

        if current.distance_to(goal) > step {
            path.push(*goal);
        }
        path
    }
}

/// Aggregate hostile pressure at a point, plus terrain risk.
fn threat_field(point: &Pose, snapshot: &BattlefieldSnapshot) -> f64 {
    let mut field = 0.0;
    for enemy in &snapshot.hostile_units {
        let distance = point.distance_to(&enemy.pose).max(25.0);
        field += (enemy.threat_level * 120.0 + 20.0) / distance;
        if enemy.unit_type == UnitType::Artillery {
            field += 12.0 / distance.sqrt();
        }
    }
    field + 5.0 * snapshot.env.terrain_risk
}

/// Step away from `other` in the horizontal plane; altitude is preserved.
fn move_away(unit: &Pose, other: &Pose, step: f64) -> Pose {
    let dx = unit.x - other.x;
    let dy = unit.y - other.y;
    let norm = (dx * dx + dy * dy).sqrt().max(1.0);
    Pose::new(unit.x + dx / norm * step, unit.y + dy / norm * step, unit.z)
}

/// Pull the goal toward or away from the force centroid per formation mode.
fn blend_goal(goal: &Pose, unit: &Pose, centroid: &Pose, mode: FormationMode) -> Pose {
    match mode {
        FormationMode::Disperse => goal.midpoint(&move_away(unit, centroid, 40.0)),
        FormationMode::Assemble => Pose::new(
            0.8 * goal.x + 0.2 * centroid.x,
            0.8 * goal.y + 0.2 * centroid.y,
            0.8 * goal.z + 0.2 * centroid.z,
        ),
    }
}

fn friendly_centroid(snapshot: &BattlefieldSnapshot) -> Pose {
    let count = snapshot.friendly_units.len() as f64;
    let mut centroid = Pose::default();
    for unit in &snapshot.friendly_units {
        centroid.x += unit.pose.x;
        centroid.y += unit.pose.y;
        centroid.z += unit.pose.z;
    }
    centroid.x /= count;
    centroid.y /= count;
    centroid.z /= count;
    centroid
}
