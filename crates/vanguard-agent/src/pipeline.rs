//! The per-tick decision pipeline.
//!
//! Orchestrates cache probe → memory append → situation fusion → fire and
//! maneuver engines → ranker → cache store. The cache short-circuits the
//! whole tick, memory and fusion included.

use tracing::debug;

use vanguard_core::constants::{DEFAULT_CACHE_TTL_MS, DEFAULT_MEMORY_WINDOW_MS};
use vanguard_core::decision::DecisionPackage;
use vanguard_core::entity::BattlefieldSnapshot;
use vanguard_core::enums::EventType;
use vanguard_core::events::EventRecord;
use vanguard_core::types::Pose;

use vanguard_model::{DecisionRanker, RankRequest};

use crate::cache::DecisionCache;
use crate::fire_control::FireControlEngine;
use crate::fusion;
use crate::maneuver::ManeuverEngine;
use crate::memory::EventMemory;

const CONSERVATIVE_CANDIDATE: &str =
    "Candidate-B conservative: prioritize cover and defer long-range fire when confidence is low";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub cache_ttl_ms: i64,
    pub memory_window_ms: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            memory_window_ms: DEFAULT_MEMORY_WINDOW_MS,
        }
    }
}

pub struct AgentPipeline {
    config: PipelineConfig,
    memory: EventMemory,
    fire_engine: FireControlEngine,
    maneuver_engine: ManeuverEngine,
    ranker: Box<dyn DecisionRanker>,
    cache: DecisionCache,
}

impl AgentPipeline {
    pub fn new(
        config: PipelineConfig,
        fire_engine: FireControlEngine,
        maneuver_engine: ManeuverEngine,
        ranker: Box<dyn DecisionRanker>,
    ) -> Self {
        // Memory keeps twice the queried window so late probes still hit.
        let memory = EventMemory::new(config.memory_window_ms * 2);
        let cache = DecisionCache::new(config.cache_ttl_ms);
        Self {
            config,
            memory,
            fire_engine,
            maneuver_engine,
            ranker,
            cache,
        }
    }

    /// Run one decision tick against a snapshot and the events drained from
    /// the adapter since the previous tick.
    pub fn tick(
        &mut self,
        snapshot: &BattlefieldSnapshot,
        dis_events: Vec<EventRecord>,
    ) -> DecisionPackage {
        self.cache.prune(snapshot.timestamp_ms);
        let cache_key = build_cache_key(snapshot);

        if let Some(mut cached) = self.cache.get(&cache_key, snapshot.timestamp_ms) {
            debug!(key = %cache_key, "decision cache hit");
            cached.from_cache = true;
            return cached;
        }

        self.memory.add_events(dis_events);
        let recent_events = self
            .memory
            .query_recent(snapshot.timestamp_ms, self.config.memory_window_ms);

        let semantics = fusion::infer(snapshot, &recent_events);
        for tag in &semantics.tags {
            self.memory.add_event(EventRecord {
                timestamp_ms: snapshot.timestamp_ms,
                event_type: EventType::TacticalTag,
                actor_id: "fusion".to_string(),
                pose: Pose::default(),
                message: format!("{}:{}", tag.name.as_str(), tag.reason),
            });
        }

        let fire = self.fire_engine.decide(snapshot, &self.memory);
        let maneuver = self.maneuver_engine.decide(snapshot, &semantics);

        let context = self
            .memory
            .build_context(snapshot.timestamp_ms, self.config.memory_window_ms);
        let candidates = vec![
            format!(
                "Candidate-A aggressive: {};{}",
                fire.summary, maneuver.summary
            ),
            CONSERVATIVE_CANDIDATE.to_string(),
        ];
        let ranking = self.ranker.rank_and_explain(&RankRequest {
            context,
            candidate_summaries: candidates,
        });

        let package = DecisionPackage {
            fire,
            maneuver,
            explanation: format!(
                "selected_index={}; {}",
                ranking.selected_index, ranking.explanation
            ),
            from_cache: false,
        };

        self.cache
            .put(cache_key, package.clone(), snapshot.timestamp_ms);
        package
    }

    /// Read-only memory access for tests.
    #[cfg(test)]
    pub(crate) fn memory(&self) -> &EventMemory {
        &self.memory
    }
}

/// Deterministic snapshot fingerprint: force sizes, visibility in 100 m
/// bins, then every unit id with its position quantized into 100 m bins
/// (floor toward negative infinity), in snapshot order.
pub fn build_cache_key(snapshot: &BattlefieldSnapshot) -> String {
    let mut key = format!(
        "f={}|h={}|v={}",
        snapshot.friendly_units.len(),
        snapshot.hostile_units.len(),
        (snapshot.env.visibility_m / 100.0).floor() as i64
    );
    for unit in snapshot
        .friendly_units
        .iter()
        .chain(snapshot.hostile_units.iter())
    {
        key.push_str(&format!(
            "|{}@{},{}",
            unit.id,
            (unit.pose.x / 100.0).floor() as i64,
            (unit.pose.y / 100.0).floor() as i64
        ));
    }
    key
}
