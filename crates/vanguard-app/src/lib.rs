//! Shared plumbing for the VANGUARD command-line entry points.

use std::path::Path;

use vanguard_core::entity::{BattlefieldSnapshot, EntityState, EnvironmentState};
use vanguard_core::enums::{Side, UnitType};
use vanguard_core::loadout::default_loadout;
use vanguard_core::types::Pose;
use vanguard_model::{RankerBackend, RankerConfig};

/// Install the fmt subscriber; `RUST_LOG` controls the filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();
}

/// Ranker configuration from the environment. `VANGUARD_MODEL_BACKEND=openai`
/// selects the HTTP backend (with a replay-friendly timeout); anything else
/// gets the mock.
pub fn ranker_config_from_env() -> RankerConfig {
    let backend = match std::env::var("VANGUARD_MODEL_BACKEND").as_deref() {
        Ok("openai") => RankerBackend::OpenAiCompatible,
        _ => RankerBackend::Mock,
    };
    let timeout_ms = match backend {
        RankerBackend::OpenAiCompatible => 120_000,
        RankerBackend::Mock => 250,
    };
    let mut config = RankerConfig {
        backend,
        timeout_ms,
        ..RankerConfig::default()
    };
    if let Ok(endpoint) = std::env::var("VANGUARD_MODEL_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Ok(api_key) = std::env::var("VANGUARD_MODEL_API_KEY") {
        config.api_key = api_key;
    }
    config
}

/// Binary replays carry a `.bin`, `.dis`, or `.disbin` extension; anything
/// else goes through the text loader.
pub fn is_binary_replay(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("bin") | Some("dis") | Some("disbin")
    )
}

/// Replay run statistics printed by the replay runner.
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub frames: usize,
    pub ticks: usize,
    pub decisions: usize,
    pub cache_hits: usize,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
}

impl ReplayStats {
    /// Fill the latency figures from per-tick samples (milliseconds).
    pub fn with_latencies(mut self, mut latencies_ms: Vec<f64>) -> Self {
        if latencies_ms.is_empty() {
            return self;
        }
        latencies_ms.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        self.avg_latency_ms = latencies_ms.iter().sum::<f64>() / latencies_ms.len() as f64;
        let p95_index = ((latencies_ms.len() as f64 * 0.95) as usize).min(latencies_ms.len() - 1);
        self.p95_latency_ms = latencies_ms[p95_index];
        self
    }
}

/// Two-on-two demo battlefield used by the single-tick demo binary.
pub fn build_mock_snapshot(now_ms: i64) -> BattlefieldSnapshot {
    let unit = |id: &str, side: Side, unit_type: UnitType, pose: Pose, speed: f64, threat: f64| {
        EntityState {
            id: id.to_string(),
            side,
            unit_type,
            pose,
            speed_mps: speed,
            heading_deg: 0.0,
            threat_level: threat,
            alive: true,
            formation_group: None,
            weapons: default_loadout(unit_type),
        }
    };

    BattlefieldSnapshot {
        timestamp_ms: now_ms,
        friendly_units: vec![
            unit(
                "F-1",
                Side::Friendly,
                UnitType::Armor,
                Pose::new(0.0, 0.0, 0.0),
                6.0,
                0.4,
            ),
            unit(
                "F-2",
                Side::Friendly,
                UnitType::Infantry,
                Pose::new(-20.0, -15.0, 0.0),
                2.0,
                0.3,
            ),
        ],
        hostile_units: vec![
            unit(
                "H-1",
                Side::Hostile,
                UnitType::Armor,
                Pose::new(450.0, 200.0, 0.0),
                8.5,
                0.9,
            ),
            unit(
                "H-2",
                Side::Hostile,
                UnitType::Artillery,
                Pose::new(-180.0, 130.0, 0.0),
                3.0,
                0.8,
            ),
        ],
        env: EnvironmentState {
            visibility_m: 900.0,
            weather_risk: 0.2,
            terrain_risk: 0.0,
        },
    }
}
