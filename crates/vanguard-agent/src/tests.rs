//! Tests for memory, fusion, the engines, the cache, the pipeline, and the
//! replay metrics evaluator.

use std::time::Instant;

use vanguard_core::decision::{DecisionPackage, FireDecision, SituationSemantics, TargetAssignment};
use vanguard_core::entity::{BattlefieldSnapshot, EntityState, EnvironmentState, WeaponState};
use vanguard_core::enums::{
    EventType, FireTactic, FormationMode, ManeuverKind, Side, TagName, UnitType,
};
use vanguard_core::events::EventRecord;
use vanguard_core::loadout::default_loadout;
use vanguard_core::types::Pose;

use vanguard_model::{build_ranker, RankerConfig};

use crate::cache::DecisionCache;
use crate::fire_control::{FireControlConfig, FireControlEngine};
use crate::fusion;
use crate::maneuver::{ManeuverConfig, ManeuverEngine};
use crate::memory::EventMemory;
use crate::metrics::ReplayMetricsEvaluator;
use crate::pipeline::{build_cache_key, AgentPipeline, PipelineConfig};

// ---- Builders ----

fn unit(id: &str, side: Side, unit_type: UnitType, pose: Pose) -> EntityState {
    EntityState {
        id: id.to_string(),
        side,
        unit_type,
        pose,
        speed_mps: 0.0,
        heading_deg: 0.0,
        threat_level: 0.3,
        alive: true,
        formation_group: None,
        weapons: default_loadout(unit_type),
    }
}

fn friendly(id: &str, unit_type: UnitType, pose: Pose) -> EntityState {
    unit(id, Side::Friendly, unit_type, pose)
}

fn hostile(id: &str, unit_type: UnitType, pose: Pose, speed: f64, threat: f64) -> EntityState {
    let mut u = unit(id, Side::Hostile, unit_type, pose);
    u.speed_mps = speed;
    u.threat_level = threat;
    u
}

fn snapshot(
    ts: i64,
    friendly_units: Vec<EntityState>,
    hostile_units: Vec<EntityState>,
) -> BattlefieldSnapshot {
    BattlefieldSnapshot {
        timestamp_ms: ts,
        friendly_units,
        hostile_units,
        env: EnvironmentState::default(),
    }
}

fn weapon_fire_event(ts: i64, shooter: &str, message: &str) -> EventRecord {
    EventRecord {
        timestamp_ms: ts,
        event_type: EventType::WeaponFire,
        actor_id: shooter.to_string(),
        pose: Pose::default(),
        message: message.to_string(),
    }
}

fn mock_pipeline(config: PipelineConfig) -> AgentPipeline {
    AgentPipeline::new(
        config,
        FireControlEngine::default(),
        ManeuverEngine::default(),
        build_ranker(RankerConfig::default()),
    )
}

// ---- Event memory ----

#[test]
fn test_memory_trims_by_retention() {
    let mut memory = EventMemory::new(300_000);
    memory.add_event(weapon_fire_event(400_000, "H-1", "武器=rifle，目标=F-1"));
    memory.add_event(weapon_fire_event(970_000, "H-2", "武器=rifle，目标=F-2"));

    assert_eq!(memory.len(), 1, "first event fell out of retention");
    let recent = memory.query_recent(970_000, 60_000);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].actor_id, "H-2");
}

#[test]
fn test_memory_query_recent_ordering() {
    let mut memory = EventMemory::new(600_000);
    for ts in [1_000, 2_000, 3_000, 4_000] {
        memory.add_event(weapon_fire_event(ts, "H-1", "fire"));
    }

    let recent = memory.query_recent(4_000, 10_000);
    assert_eq!(recent.len(), 4);
    for pair in recent.windows(2) {
        assert!(
            pair[0].timestamp_ms > pair[1].timestamp_ms,
            "events must be strictly most-recent-first"
        );
    }
    for event in &recent {
        assert!(4_000 - event.timestamp_ms <= 10_000);
    }
}

#[test]
fn test_memory_window_excludes_old_events() {
    let mut memory = EventMemory::new(600_000);
    memory.add_event(weapon_fire_event(1_000, "H-1", "old"));
    memory.add_event(weapon_fire_event(500_000, "H-2", "new"));

    let recent = memory.query_recent(500_000, 60_000);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].message, "new");
}

#[test]
fn test_memory_context_format() {
    let mut memory = EventMemory::new(600_000);
    memory.add_event(weapon_fire_event(1_500, "H-1", "武器=howitzer，目标=F-1"));

    let context = memory.build_context(2_000, 10_000);
    assert_eq!(context, "[t=1500] 武器开火: 武器=howitzer，目标=F-1\n");
}

#[test]
fn test_memory_last_event_by_type() {
    let mut memory = EventMemory::new(600_000);
    memory.add_event(weapon_fire_event(1_000, "H-1", "a"));
    memory.add_event(EventRecord {
        timestamp_ms: 2_000,
        event_type: EventType::TacticalTag,
        actor_id: "fusion".to_string(),
        pose: Pose::default(),
        message: "stable_contact:ok".to_string(),
    });
    memory.add_event(weapon_fire_event(3_000, "H-2", "b"));

    let last = memory
        .last_event_by_type(EventType::WeaponFire, 3_000, 10_000)
        .expect("weapon fire within window");
    assert_eq!(last.actor_id, "H-2");

    assert!(memory
        .last_event_by_type(EventType::UnitLoss, 3_000, 10_000)
        .is_none());
    assert!(memory
        .last_event_by_type(EventType::WeaponFire, 300_000, 10_000)
        .is_none());
}

// ---- Situation fusion ----

#[test]
fn test_fusion_insufficient_contact() {
    let snap = snapshot(1_000, Vec::new(), vec![hostile(
        "H-1",
        UnitType::Armor,
        Pose::new(500.0, 0.0, 0.0),
        5.0,
        0.9,
    )]);
    let semantics = fusion::infer(&snap, &[]);
    assert_eq!(semantics.tags.len(), 1);
    assert_eq!(semantics.tags[0].name, TagName::InsufficientContact);
    assert_eq!(semantics.tags[0].confidence, 1.0);
}

#[test]
fn test_fusion_left_flank_exposed() {
    let snap = snapshot(
        1_000,
        vec![friendly("F-1", UnitType::Infantry, Pose::new(100.0, 0.0, 0.0))],
        vec![
            hostile("H-1", UnitType::Infantry, Pose::new(150.0, 300.0, 0.0), 2.0, 0.4),
            hostile("H-2", UnitType::Infantry, Pose::new(5_000.0, 0.0, 0.0), 2.0, 0.4),
        ],
    );
    let semantics = fusion::infer(&snap, &[]);
    assert!(semantics.has_tag(TagName::LeftFlankExposed));
    let tag = semantics
        .tags
        .iter()
        .find(|t| t.name == TagName::LeftFlankExposed)
        .unwrap();
    assert!((tag.confidence - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_fusion_armor_cluster() {
    let snap = snapshot(
        1_000,
        vec![friendly("F-1", UnitType::Infantry, Pose::new(0.0, 0.0, 0.0))],
        vec![
            hostile("H-1", UnitType::Armor, Pose::new(1_000.0, 0.0, 0.0), 5.0, 0.9),
            hostile("H-2", UnitType::Armor, Pose::new(1_500.0, 500.0, 0.0), 5.0, 0.9),
            hostile("H-3", UnitType::Armor, Pose::new(9_000.0, 0.0, 0.0), 5.0, 0.9),
        ],
    );
    let semantics = fusion::infer(&snap, &[]);
    let tag = semantics
        .tags
        .iter()
        .find(|t| t.name == TagName::EnemyArmorClusterApproaching)
        .expect("two armor units within 2200 m");
    assert!((tag.confidence - 0.5).abs() < 1e-9);
}

#[test]
fn test_fusion_low_visibility_and_artillery_memory() {
    let mut snap = snapshot(
        1_000,
        vec![friendly("F-1", UnitType::Infantry, Pose::new(0.0, 0.0, 0.0))],
        vec![hostile("H-1", UnitType::Infantry, Pose::new(9_000.0, 9_000.0, 0.0), 0.0, 0.1)],
    );
    snap.env.visibility_m = 600.0;

    let events = vec![weapon_fire_event(900, "H-9", "武器=howitzer，目标=F-1")];
    let semantics = fusion::infer(&snap, &events);

    assert!(semantics.has_tag(TagName::LowVisibility));
    assert!(semantics.has_tag(TagName::RecentEnemyArtilleryActivity));
    assert!(!semantics.has_tag(TagName::StableContact));
}

#[test]
fn test_fusion_stable_contact_fallback() {
    let snap = snapshot(
        1_000,
        vec![friendly("F-1", UnitType::Infantry, Pose::new(0.0, 0.0, 0.0))],
        vec![hostile("H-1", UnitType::Infantry, Pose::new(9_000.0, 9_000.0, 0.0), 0.0, 0.1)],
    );
    let semantics = fusion::infer(&snap, &[]);
    assert_eq!(semantics.tags.len(), 1);
    assert_eq!(semantics.tags[0].name, TagName::StableContact);
    assert_eq!(semantics.tags[0].confidence, 0.60);
}

#[test]
fn test_fusion_confidence_bounds() {
    // Six hostiles on the flank: count/3 would exceed 1 without the clamp.
    let hostiles: Vec<EntityState> = (0..6)
        .map(|i| {
            hostile(
                &format!("H-{i}"),
                UnitType::Infantry,
                Pose::new(-500.0, 100.0 * i as f64, 0.0),
                2.0,
                0.4,
            )
        })
        .collect();
    let snap = snapshot(
        1_000,
        vec![friendly("F-1", UnitType::Infantry, Pose::new(0.0, 0.0, 0.0))],
        hostiles,
    );
    let semantics = fusion::infer(&snap, &[]);
    for tag in &semantics.tags {
        assert!((0.0..=1.0).contains(&tag.confidence), "tag {:?}", tag.name);
    }
}

// ---- Fire control ----

fn tank_gun(kill_probability: f64, ammo: u32) -> WeaponState {
    WeaponState {
        name: "tank_gun".to_string(),
        range_m: 2500.0,
        kill_probability,
        ammo,
        ready_in_s: 0.0,
        preferred_targets: vec![UnitType::Armor, UnitType::Artillery, UnitType::Command],
    }
}

#[test]
fn test_focus_fire_trigger() {
    let mut shooter_a = friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0));
    shooter_a.weapons = vec![tank_gun(0.7, 10)];
    let mut shooter_b = friendly("F-2", UnitType::Armor, Pose::new(50.0, 0.0, 0.0));
    shooter_b.weapons = vec![tank_gun(0.7, 10)];

    let snap = snapshot(
        1_000,
        vec![shooter_a, shooter_b],
        vec![
            hostile("H-armor", UnitType::Armor, Pose::new(500.0, 120.0, 0.0), 10.0, 0.95),
            hostile("H-inf", UnitType::Infantry, Pose::new(600.0, 200.0, 0.0), 0.0, 0.2),
        ],
    );

    let engine = FireControlEngine::new(FireControlConfig {
        enable_focus_fire: true,
        enable_stagger_fire: true,
        max_shooters_per_target: 2,
        focus_fire_threat_threshold: 70.0,
    });
    let decision = engine.decide(&snap, &EventMemory::default());

    assert_eq!(decision.threats[0].target_id, "H-armor");
    assert!(decision
        .assignments
        .iter()
        .any(|a| a.tactic == FireTactic::FocusFire));

    let on_top = decision
        .assignments
        .iter()
        .filter(|a| a.target_id == "H-armor")
        .count();
    assert!(on_top <= 2, "no target may hold more than max shooters");
    assert!(decision.summary.contains("最高威胁=H-armor"));
}

#[test]
fn test_assignment_invariants() {
    let snap = snapshot(
        1_000,
        vec![
            friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0)),
            friendly("F-2", UnitType::Artillery, Pose::new(-100.0, 50.0, 0.0)),
            friendly("F-3", UnitType::Infantry, Pose::new(30.0, -40.0, 0.0)),
        ],
        vec![
            hostile("H-1", UnitType::Armor, Pose::new(900.0, 300.0, 0.0), 8.0, 0.9),
            hostile("H-2", UnitType::Artillery, Pose::new(2_000.0, -500.0, 0.0), 3.0, 0.8),
            hostile("H-3", UnitType::Infantry, Pose::new(400.0, 100.0, 0.0), 2.0, 0.4),
        ],
    );

    let decision = FireControlEngine::default().decide(&snap, &EventMemory::default());
    assert!(!decision.assignments.is_empty());

    for assignment in &decision.assignments {
        let shooter = snap
            .friendly_units
            .iter()
            .find(|u| u.id == assignment.shooter_id)
            .expect("shooter present in snapshot");
        assert!(shooter.alive);
        let target = snap
            .hostile_units
            .iter()
            .find(|u| u.id == assignment.target_id)
            .expect("target present in snapshot");
        assert!(target.alive);
        assert!(shooter.weapons.iter().any(|w| w.name == assignment.weapon_name));
        assert!(assignment.score > 0.0);
        assert!(assignment.scheduled_offset_s >= 0.0);
    }
}

#[test]
fn test_stagger_offsets_follow_score_ranking() {
    let snap = snapshot(
        1_000,
        vec![
            friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0)),
            friendly("F-2", UnitType::Armor, Pose::new(1_500.0, 0.0, 0.0)),
        ],
        vec![hostile("H-1", UnitType::Armor, Pose::new(700.0, 0.0, 0.0), 5.0, 0.9)],
    );

    let engine = FireControlEngine::new(FireControlConfig {
        enable_focus_fire: false,
        enable_stagger_fire: true,
        ..FireControlConfig::default()
    });
    let decision = engine.decide(&snap, &EventMemory::default());

    assert_eq!(decision.assignments.len(), 2);
    assert!(decision.assignments[0].score >= decision.assignments[1].score);
    assert_eq!(decision.assignments[0].scheduled_offset_s, 0.0);
    assert_eq!(decision.assignments[1].scheduled_offset_s, 1.25);
    for assignment in &decision.assignments {
        assert_eq!(assignment.tactic, FireTactic::StaggerFire);
    }
}

#[test]
fn test_no_assignment_when_weapons_ineligible() {
    let mut dry = friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0));
    dry.weapons[0].ammo = 0;
    let mut cooling = friendly("F-2", UnitType::Armor, Pose::new(10.0, 0.0, 0.0));
    cooling.weapons[0].ready_in_s = 4.0;
    let unarmed = EntityState {
        weapons: Vec::new(),
        ..friendly("F-3", UnitType::Infantry, Pose::new(20.0, 0.0, 0.0))
    };

    let snap = snapshot(
        1_000,
        vec![dry, cooling, unarmed],
        vec![hostile("H-1", UnitType::Armor, Pose::new(800.0, 0.0, 0.0), 5.0, 0.9)],
    );
    let decision = FireControlEngine::default().decide(&snap, &EventMemory::default());
    assert!(decision.assignments.is_empty());
    assert!(!decision.threats.is_empty(), "threats are still scored");
    assert!(decision.summary.contains("火力分配数=0"));
}

#[test]
fn test_dead_units_are_skipped() {
    let mut dead_shooter = friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0));
    dead_shooter.alive = false;
    let mut dead_target = hostile("H-1", UnitType::Armor, Pose::new(500.0, 0.0, 0.0), 5.0, 0.9);
    dead_target.alive = false;

    let snap = snapshot(
        1_000,
        vec![dead_shooter, friendly("F-2", UnitType::Armor, Pose::new(50.0, 0.0, 0.0))],
        vec![dead_target, hostile("H-2", UnitType::Infantry, Pose::new(600.0, 0.0, 0.0), 2.0, 0.4)],
    );
    let decision = FireControlEngine::default().decide(&snap, &EventMemory::default());

    assert!(decision.threats.iter().all(|t| t.target_id != "H-1"));
    for assignment in &decision.assignments {
        assert_ne!(assignment.shooter_id, "F-1");
        assert_ne!(assignment.target_id, "H-1");
    }
}

#[test]
fn test_summary_reports_recent_fire_memory() {
    let snap = snapshot(
        600_000,
        vec![friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0))],
        vec![hostile("H-1", UnitType::Armor, Pose::new(500.0, 0.0, 0.0), 5.0, 0.9)],
    );

    let mut memory = EventMemory::default();
    let decision = FireControlEngine::default().decide(&snap, &memory);
    assert!(decision.summary.contains("近期火力记忆=无"));

    memory.add_event(weapon_fire_event(580_000, "H-1", "武器=tank_gun，目标=F-1"));
    let decision = FireControlEngine::default().decide(&snap, &memory);
    assert!(decision.summary.contains("近期火力记忆=有"));
}

#[test]
fn test_weapon_preference_steers_selection() {
    // Equal distances; the sam prefers air defense, the generic tube does not.
    let mut shooter = friendly("F-1", UnitType::AirDefense, Pose::new(0.0, 0.0, 0.0));
    shooter.weapons = vec![
        WeaponState {
            name: "generic".to_string(),
            range_m: 3500.0,
            kill_probability: 0.6,
            ammo: 10,
            ready_in_s: 0.0,
            preferred_targets: vec![UnitType::Infantry],
        },
        WeaponState {
            name: "sam".to_string(),
            range_m: 3500.0,
            kill_probability: 0.6,
            ammo: 10,
            ready_in_s: 0.0,
            preferred_targets: vec![UnitType::AirDefense],
        },
    ];

    let snap = snapshot(
        1_000,
        vec![shooter],
        vec![hostile("H-1", UnitType::AirDefense, Pose::new(1_000.0, 0.0, 0.0), 4.0, 0.8)],
    );
    let decision = FireControlEngine::default().decide(&snap, &EventMemory::default());
    assert_eq!(decision.assignments.len(), 1);
    assert_eq!(decision.assignments[0].weapon_name, "sam");
}

// ---- Maneuver ----

#[test]
fn test_emergency_evasion() {
    let mut infantry = friendly("F-1", UnitType::Infantry, Pose::new(0.0, 0.0, 0.0));
    infantry.weapons = Vec::new();
    let threat_pose = Pose::new(100.0, 80.0, 0.0);
    let snap = snapshot(
        1_000,
        vec![infantry],
        vec![hostile("H-1", UnitType::Armor, threat_pose, 5.0, 0.9)],
    );

    let decision = ManeuverEngine::default().decide(&snap, &SituationSemantics::default());
    assert_eq!(decision.actions.len(), 1);

    let action = &decision.actions[0];
    assert_eq!(action.action, ManeuverKind::EmergencyEvasion);
    assert_eq!(action.path.len(), 2);
    assert_eq!(action.path[0], Pose::new(0.0, 0.0, 0.0));
    assert_eq!(*action.path.last().unwrap(), action.next_pose);

    let before = Pose::new(0.0, 0.0, 0.0).distance_to(&threat_pose);
    let after = action.next_pose.distance_to(&threat_pose);
    assert!(after > before, "evasion must open distance to the threat");
}

#[test]
fn test_path_invariants_and_formation_modes() {
    let config = ManeuverConfig::default();
    let snap = snapshot(
        1_000,
        vec![
            friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0)),
            friendly("F-2", UnitType::Infantry, Pose::new(200.0, 100.0, 0.0)),
        ],
        vec![hostile("H-1", UnitType::Artillery, Pose::new(4_000.0, 4_000.0, 0.0), 3.0, 0.8)],
    );

    // No tags: assemble posture, advance bounds.
    let calm = ManeuverEngine::default().decide(&snap, &SituationSemantics::default());
    assert_eq!(calm.formation_mode, FormationMode::Assemble);
    for action in &calm.actions {
        assert_eq!(action.action, ManeuverKind::AdvanceBound);
        let unit = snap
            .friendly_units
            .iter()
            .find(|u| u.id == action.unit_id)
            .unwrap();
        assert_eq!(action.path[0], unit.pose);
        assert_eq!(*action.path.last().unwrap(), action.next_pose);
        assert!(action.path.len() <= config.path_horizon_steps + 2);
    }

    // Flank tag: disperse posture, flank reinforcement.
    let mut semantics = SituationSemantics::default();
    semantics.tags.push(vanguard_core::decision::TacticalTag {
        name: TagName::LeftFlankExposed,
        confidence: 0.8,
        reason: "左翼边界出现敌方集中态势".to_string(),
    });
    let flanked = ManeuverEngine::default().decide(&snap, &semantics);
    assert_eq!(flanked.formation_mode, FormationMode::Disperse);
    for action in &flanked.actions {
        assert_eq!(action.action, ManeuverKind::FlankReinforce);
        assert!(action.path.len() <= config.path_horizon_steps + 2);
    }
}

#[test]
fn test_armor_cluster_takes_terrain() {
    let snap = snapshot(
        1_000,
        vec![friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0))],
        vec![hostile("H-1", UnitType::Armor, Pose::new(2_000.0, 0.0, 0.0), 5.0, 0.9)],
    );
    let mut semantics = SituationSemantics::default();
    semantics.tags.push(vanguard_core::decision::TacticalTag {
        name: TagName::EnemyArmorClusterApproaching,
        confidence: 0.5,
        reason: "交战范围内出现多条装甲目标轨迹".to_string(),
    });

    let decision = ManeuverEngine::default().decide(&snap, &semantics);
    assert_eq!(decision.formation_mode, FormationMode::Assemble);
    assert_eq!(decision.actions[0].action, ManeuverKind::OccupyAdvantageousTerrain);
}

#[test]
fn test_empty_friendly_force() {
    let snap = snapshot(
        1_000,
        Vec::new(),
        vec![hostile("H-1", UnitType::Armor, Pose::new(500.0, 0.0, 0.0), 5.0, 0.9)],
    );
    let decision = ManeuverEngine::default().decide(&snap, &SituationSemantics::default());
    assert!(decision.actions.is_empty());
    assert_eq!(decision.summary, "机动动作数=0");
}

// ---- Decision cache ----

#[test]
fn test_cache_ttl_expiry_and_prune() {
    let mut cache = DecisionCache::new(3_000);
    let package = DecisionPackage {
        explanation: "selected_index=0; baseline".to_string(),
        ..DecisionPackage::default()
    };
    cache.put("k".to_string(), package, 1_000);

    assert!(cache.get("k", 2_000).is_some());
    assert!(cache.get("k", 4_000).is_some(), "exactly at TTL is fresh");
    assert!(cache.get("k", 4_001).is_none());

    cache.prune(4_001);
    assert!(cache.is_empty());
}

#[test]
fn test_cache_returns_independent_copies() {
    let mut cache = DecisionCache::new(3_000);
    cache.put("k".to_string(), DecisionPackage::default(), 1_000);

    let mut first = cache.get("k", 1_000).unwrap();
    first.from_cache = true;
    first.explanation = "mutated".to_string();

    let second = cache.get("k", 1_000).unwrap();
    assert!(!second.from_cache);
    assert!(second.explanation.is_empty());
}

// ---- Pipeline ----

fn demo_snapshot(ts: i64) -> BattlefieldSnapshot {
    snapshot(
        ts,
        vec![
            friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0)),
            friendly("F-2", UnitType::Infantry, Pose::new(-20.0, -15.0, 0.0)),
        ],
        vec![
            hostile("H-1", UnitType::Armor, Pose::new(450.0, 200.0, 0.0), 8.5, 0.9),
            hostile("H-2", UnitType::Artillery, Pose::new(-180.0, 130.0, 0.0), 3.0, 0.8),
        ],
    )
}

#[test]
fn test_pipeline_cache_hit_on_identical_snapshot() {
    let mut pipeline = mock_pipeline(PipelineConfig {
        cache_ttl_ms: 3_000,
        ..PipelineConfig::default()
    });
    let snap = demo_snapshot(1_000);

    let first = pipeline.tick(&snap, Vec::new());
    assert!(!first.from_cache);
    assert!(!first.fire.assignments.is_empty());
    assert!(!first.maneuver.actions.is_empty());
    assert!(first.explanation.starts_with("selected_index=0; "));

    let second = pipeline.tick(&snap, Vec::new());
    assert!(second.from_cache);
    assert_eq!(first.fire.summary, second.fire.summary);
    assert_eq!(first.maneuver.summary, second.maneuver.summary);
    assert_eq!(
        serde_json::to_string(&first.fire).unwrap(),
        serde_json::to_string(&second.fire).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.maneuver).unwrap(),
        serde_json::to_string(&second.maneuver).unwrap()
    );
}

#[test]
fn test_pipeline_cache_expires_with_time() {
    let mut pipeline = mock_pipeline(PipelineConfig {
        cache_ttl_ms: 3_000,
        ..PipelineConfig::default()
    });

    pipeline.tick(&demo_snapshot(1_000), Vec::new());
    // Same entity bins, timestamp outside TTL.
    let late = pipeline.tick(&demo_snapshot(10_000), Vec::new());
    assert!(!late.from_cache);
}

#[test]
fn test_pipeline_records_tags_in_memory() {
    let mut pipeline = mock_pipeline(PipelineConfig::default());
    pipeline.tick(&demo_snapshot(1_000), Vec::new());

    let tag_event = pipeline
        .memory()
        .last_event_by_type(EventType::TacticalTag, 1_000, 10_000)
        .expect("fusion tags are recorded into memory");
    assert!(tag_event.message.contains(':'));
    assert_eq!(tag_event.actor_id, "fusion");
}

#[test]
fn test_cache_key_quantizes_positions() {
    let a = demo_snapshot(1_000);
    let mut b = demo_snapshot(1_000);
    // Jitter within the 100 m bin: same key.
    b.friendly_units[0].pose.x += 40.0;
    assert_eq!(build_cache_key(&a), build_cache_key(&b));

    // Crossing the bin boundary flips the key.
    let mut c = demo_snapshot(1_000);
    c.friendly_units[0].pose.x += 120.0;
    assert_ne!(build_cache_key(&a), build_cache_key(&c));

    // Floor toward negative infinity, not toward zero.
    let mut d = demo_snapshot(1_000);
    d.friendly_units[0].pose.x = -40.0;
    assert!(build_cache_key(&d).contains("|F-1@-1,0"));
}

// ---- Replay metrics ----

#[test]
fn test_kill_credit_attribution() {
    let mut evaluator = ReplayMetricsEvaluator::default();

    let initial = snapshot(
        1_000,
        vec![
            friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0)),
            friendly("F-2", UnitType::Infantry, Pose::new(-20.0, -15.0, 0.0)),
        ],
        vec![hostile("H-1", UnitType::Armor, Pose::new(450.0, 200.0, 0.0), 8.5, 0.9)],
    );
    evaluator.observe_snapshot(&initial);

    let decision = DecisionPackage {
        fire: FireDecision {
            assignments: vec![
                TargetAssignment {
                    shooter_id: "F-1".to_string(),
                    target_id: "H-1".to_string(),
                    weapon_name: "tank_gun".to_string(),
                    score: 90.0,
                    expected_kill_prob: 0.65,
                    scheduled_offset_s: 0.0,
                    tactic: FireTactic::FocusFire,
                    rationale: String::new(),
                },
                TargetAssignment {
                    shooter_id: "F-2".to_string(),
                    target_id: "H-1".to_string(),
                    weapon_name: "rifle".to_string(),
                    score: 40.0,
                    expected_kill_prob: 0.25,
                    scheduled_offset_s: 1.25,
                    tactic: FireTactic::FocusFire,
                    rationale: String::new(),
                },
            ],
            ..FireDecision::default()
        },
        ..DecisionPackage::default()
    };
    evaluator.observe_decision(1_000, &decision);

    let mut next = initial.clone();
    next.timestamp_ms = 3_000;
    next.friendly_units[1].alive = false;
    next.hostile_units[0].alive = false;
    evaluator.observe_snapshot(&next);

    let result = evaluator.finalize();
    assert_eq!(result.initial_friendly_count, 2);
    assert_eq!(result.final_friendly_alive, 1);
    assert_eq!(result.survival_rate, 50.0);
    assert_eq!(result.total_hostile_losses, 1);
    assert_eq!(result.hit_contribution_rate, 100.0);
    assert_eq!(result.shooter_kill_contribution["F-1"], 0.5);
    assert_eq!(result.shooter_kill_contribution["F-2"], 0.5);

    let credit_sum: f64 = result.shooter_kill_contribution.values().sum();
    assert!((credit_sum - 1.0).abs() < 1e-9);
}

#[test]
fn test_kill_credit_window_expires() {
    let mut evaluator = ReplayMetricsEvaluator::new(120_000);

    let initial = snapshot(
        1_000,
        vec![friendly("F-1", UnitType::Armor, Pose::new(0.0, 0.0, 0.0))],
        vec![hostile("H-1", UnitType::Armor, Pose::new(450.0, 200.0, 0.0), 8.5, 0.9)],
    );
    evaluator.observe_snapshot(&initial);

    let decision = DecisionPackage {
        fire: FireDecision {
            assignments: vec![TargetAssignment {
                shooter_id: "F-1".to_string(),
                target_id: "H-1".to_string(),
                weapon_name: "tank_gun".to_string(),
                score: 90.0,
                expected_kill_prob: 0.65,
                scheduled_offset_s: 0.0,
                tactic: FireTactic::SingleShot,
                rationale: String::new(),
            }],
            ..FireDecision::default()
        },
        ..DecisionPackage::default()
    };
    evaluator.observe_decision(1_000, &decision);

    // Loss lands long after the credit window: counted but uncredited.
    let mut late = initial.clone();
    late.timestamp_ms = 400_000;
    late.hostile_units[0].alive = false;
    evaluator.observe_snapshot(&late);

    let result = evaluator.finalize();
    assert_eq!(result.total_hostile_losses, 1);
    assert_eq!(result.hit_contribution_rate, 0.0);
    assert!(result.shooter_kill_contribution.is_empty());
}

#[test]
fn test_metrics_zero_denominators() {
    let evaluator = ReplayMetricsEvaluator::default();
    let result = evaluator.finalize();
    assert_eq!(result.survival_rate, 0.0);
    assert_eq!(result.hit_contribution_rate, 0.0);
}

// ---- Adapter-to-pipeline integration ----

#[test]
fn test_replay_batches_through_pipeline() {
    use vanguard_dis::{DisAdapter, DisEntityPdu, DisPduBatch};

    let mut adapter = DisAdapter::new();
    let mut pipeline = mock_pipeline(PipelineConfig::default());
    let mut evaluator = ReplayMetricsEvaluator::default();

    let entity = |ts: i64, id: &str, side: Side, x: f64| DisEntityPdu {
        timestamp_ms: ts,
        entity_id: id.to_string(),
        side,
        unit_type: UnitType::Armor,
        pose: Pose::new(x, 0.0, 0.0),
        speed_mps: 5.0,
        heading_deg: 0.0,
        alive: true,
        threat_level: 0.9,
    };

    let batches = vec![
        DisPduBatch {
            timestamp_ms: 1_000,
            entity_updates: vec![
                entity(1_000, "F-1", Side::Friendly, 0.0),
                entity(1_000, "H-1", Side::Hostile, 800.0),
            ],
            ..Default::default()
        },
        DisPduBatch {
            timestamp_ms: 6_000,
            entity_updates: vec![entity(6_000, "H-1", Side::Hostile, 700.0)],
            ..Default::default()
        },
    ];

    let mut decisions = 0;
    for batch in &batches {
        adapter.ingest(batch);
        let snap = adapter.poll().expect("new data each batch");
        evaluator.observe_snapshot(&snap);
        let decision = pipeline.tick(&snap, adapter.drain_events());
        evaluator.observe_decision(snap.timestamp_ms, &decision);
        assert!(!decision.from_cache);
        assert!(!decision.fire.assignments.is_empty());
        decisions += 1;
    }
    assert_eq!(decisions, 2);

    let result = evaluator.finalize();
    assert_eq!(result.initial_friendly_count, 1);
    assert_eq!(result.final_friendly_alive, 1);
    assert_eq!(result.survival_rate, 100.0);
}

// ---- Latency smoke ----

#[test]
fn test_tick_latency_smoke() {
    let mut pipeline = mock_pipeline(PipelineConfig::default());

    let start = Instant::now();
    let ticks = 200;
    for i in 0..ticks {
        // Shift positions across cache bins so every tick does full work.
        let mut snap = demo_snapshot(1_000 + i * 10);
        for unit in &mut snap.friendly_units {
            unit.pose.x += 150.0 * i as f64;
        }
        let decision = pipeline.tick(&snap, Vec::new());
        assert!(!decision.from_cache);
    }
    let avg_ms = start.elapsed().as_secs_f64() * 1000.0 / ticks as f64;
    assert!(
        avg_ms < 50.0,
        "average tick latency {avg_ms:.2}ms exceeds budget"
    );
}
