//! Situation fusion: derive tagged tactical semantics from a snapshot and
//! the recent event window.

use vanguard_core::decision::{SituationSemantics, TacticalTag};
use vanguard_core::entity::BattlefieldSnapshot;
use vanguard_core::enums::{EventType, TagName, UnitType};
use vanguard_core::events::EventRecord;

/// Lateral margin beyond the leftmost friendly that counts as flank space (m).
const LEFT_FLANK_MARGIN_M: f64 = 200.0;

/// Range within which hostile armor counts toward a cluster (m).
const ARMOR_CLUSTER_RANGE_M: f64 = 2200.0;

/// Visibility below which the low-visibility tag fires (m).
const LOW_VISIBILITY_M: f64 = 700.0;

/// Derive the tag set for one snapshot.
pub fn infer(snapshot: &BattlefieldSnapshot, recent_events: &[EventRecord]) -> SituationSemantics {
    let mut semantics = SituationSemantics::default();

    if snapshot.friendly_units.is_empty() || snapshot.hostile_units.is_empty() {
        semantics.tags.push(TacticalTag {
            name: TagName::InsufficientContact,
            confidence: 1.0,
            reason: "缺少敌我有效接触信息".to_string(),
        });
        return semantics;
    }

    let left_flank_threats = count_enemy_on_left_flank(snapshot);
    if left_flank_threats > 0 {
        semantics.tags.push(TacticalTag {
            name: TagName::LeftFlankExposed,
            confidence: (left_flank_threats as f64 / 3.0).min(1.0),
            reason: "左翼边界出现敌方集中态势".to_string(),
        });
    }

    let nearby_armor = count_nearby_armor(snapshot, ARMOR_CLUSTER_RANGE_M);
    if nearby_armor >= 2 {
        semantics.tags.push(TacticalTag {
            name: TagName::EnemyArmorClusterApproaching,
            confidence: (nearby_armor as f64 / 4.0).min(1.0),
            reason: "交战范围内出现多条装甲目标轨迹".to_string(),
        });
    }

    if snapshot.env.visibility_m < LOW_VISIBILITY_M {
        semantics.tags.push(TacticalTag {
            name: TagName::LowVisibility,
            confidence: 0.85,
            reason: "可视距离低于700米".to_string(),
        });
    }

    let recent_artillery_fire = recent_events.iter().any(|event| {
        event.event_type == EventType::WeaponFire && event.message.contains("howitzer")
    });
    if recent_artillery_fire {
        semantics.tags.push(TacticalTag {
            name: TagName::RecentEnemyArtilleryActivity,
            confidence: 0.75,
            reason: "记忆窗口内出现敌方炮兵火力活动".to_string(),
        });
    }

    if semantics.tags.is_empty() {
        semantics.tags.push(TacticalTag {
            name: TagName::StableContact,
            confidence: 0.60,
            reason: "当前未发现异常战术压力".to_string(),
        });
    }

    semantics
}

/// Hostiles left of the leftmost friendly plus the flank margin.
fn count_enemy_on_left_flank(snapshot: &BattlefieldSnapshot) -> usize {
    let leftmost_x = snapshot
        .friendly_units
        .iter()
        .map(|u| u.pose.x)
        .fold(f64::INFINITY, f64::min);
    let boundary = leftmost_x + LEFT_FLANK_MARGIN_M;

    snapshot
        .hostile_units
        .iter()
        .filter(|enemy| enemy.pose.x < boundary)
        .count()
}

/// Hostile armor units within range of any friendly.
fn count_nearby_armor(snapshot: &BattlefieldSnapshot, range_m: f64) -> usize {
    snapshot
        .hostile_units
        .iter()
        .filter(|enemy| enemy.unit_type == UnitType::Armor)
        .filter(|enemy| {
            snapshot
                .friendly_units
                .iter()
                .any(|friendly| enemy.pose.distance_to(&friendly.pose) <= range_m)
        })
        .count()
}
