//! Replay metrics: survival, hostile losses, and kill-credit attribution
//! over a sliding credit window.

use std::collections::{HashMap, HashSet};

use vanguard_core::constants::DEFAULT_KILL_CREDIT_WINDOW_MS;
use vanguard_core::decision::DecisionPackage;
use vanguard_core::entity::BattlefieldSnapshot;

#[derive(Debug, Clone)]
struct ShotRecord {
    timestamp_ms: i64,
    shooter_id: String,
}

/// Final evaluation figures.
#[derive(Debug, Clone, Default)]
pub struct ReplayMetricsResult {
    pub initial_friendly_count: usize,
    pub final_friendly_alive: usize,
    pub total_hostile_losses: usize,
    /// Percentage of the initial friendly force still alive.
    pub survival_rate: f64,
    /// Percentage of hostile losses attributable to our assignments.
    pub hit_contribution_rate: f64,
    pub shooter_kill_contribution: HashMap<String, f64>,
}

#[derive(Debug)]
pub struct ReplayMetricsEvaluator {
    kill_credit_window_ms: i64,
    initialized: bool,
    initial_friendly_count: usize,
    final_friendly_alive: usize,
    hostile_alive_state: HashMap<String, bool>,
    total_hostile_losses: usize,
    credited_losses: f64,
    shooter_kill_credit: HashMap<String, f64>,
    shots_by_target: HashMap<String, Vec<ShotRecord>>,
}

impl Default for ReplayMetricsEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_KILL_CREDIT_WINDOW_MS)
    }
}

impl ReplayMetricsEvaluator {
    pub fn new(kill_credit_window_ms: i64) -> Self {
        Self {
            kill_credit_window_ms,
            initialized: false,
            initial_friendly_count: 0,
            final_friendly_alive: 0,
            hostile_alive_state: HashMap::new(),
            total_hostile_losses: 0,
            credited_losses: 0.0,
            shooter_kill_credit: HashMap::new(),
            shots_by_target: HashMap::new(),
        }
    }

    /// Track alive-state transitions and attribute fresh hostile losses to
    /// the shooters that engaged the target inside the credit window.
    pub fn observe_snapshot(&mut self, snapshot: &BattlefieldSnapshot) {
        if !self.initialized && !snapshot.friendly_units.is_empty() {
            self.initialized = true;
            self.initial_friendly_count = snapshot.friendly_units.len();
        }

        self.final_friendly_alive = snapshot.friendly_units.iter().filter(|u| u.alive).count();

        for unit in &snapshot.hostile_units {
            let was_alive = self.hostile_alive_state.get(&unit.id).copied();

            if was_alive == Some(true) && !unit.alive {
                self.total_hostile_losses += 1;
                self.credit_loss(&unit.id, snapshot.timestamp_ms);
            }

            self.hostile_alive_state.insert(unit.id.clone(), unit.alive);
        }

        self.prune_shot_history(snapshot.timestamp_ms);
    }

    /// Record the tick's assignments as shots against their targets.
    pub fn observe_decision(&mut self, timestamp_ms: i64, decision: &DecisionPackage) {
        for assignment in &decision.fire.assignments {
            self.shots_by_target
                .entry(assignment.target_id.clone())
                .or_default()
                .push(ShotRecord {
                    timestamp_ms,
                    shooter_id: assignment.shooter_id.clone(),
                });
        }
        self.prune_shot_history(timestamp_ms);
    }

    pub fn finalize(&self) -> ReplayMetricsResult {
        debug_assert!(
            self.credited_losses <= self.total_hostile_losses as f64 + 1e-9,
            "credited losses must never exceed observed losses"
        );
        debug_assert!(
            (self.shooter_kill_credit.values().sum::<f64>() - self.credited_losses).abs() < 1e-6,
            "per-shooter credit must sum to credited losses"
        );

        let survival_rate = if self.initial_friendly_count == 0 {
            0.0
        } else {
            100.0 * self.final_friendly_alive as f64 / self.initial_friendly_count as f64
        };
        let hit_contribution_rate = if self.total_hostile_losses == 0 {
            0.0
        } else {
            100.0 * self.credited_losses / self.total_hostile_losses as f64
        };

        ReplayMetricsResult {
            initial_friendly_count: self.initial_friendly_count,
            final_friendly_alive: self.final_friendly_alive,
            total_hostile_losses: self.total_hostile_losses,
            survival_rate,
            hit_contribution_rate,
            shooter_kill_contribution: self.shooter_kill_credit.clone(),
        }
    }

    /// Split one loss evenly across the unique shooters that fired on the
    /// target within the credit window.
    fn credit_loss(&mut self, target_id: &str, now_ms: i64) {
        let Some(shots) = self.shots_by_target.get(target_id) else {
            return;
        };

        let unique_shooters: HashSet<&str> = shots
            .iter()
            .filter(|shot| now_ms - shot.timestamp_ms <= self.kill_credit_window_ms)
            .map(|shot| shot.shooter_id.as_str())
            .collect();

        if unique_shooters.is_empty() {
            return;
        }

        let credit = 1.0 / unique_shooters.len() as f64;
        let shooters: Vec<String> = unique_shooters.into_iter().map(str::to_string).collect();
        for shooter in shooters {
            *self.shooter_kill_credit.entry(shooter).or_insert(0.0) += credit;
        }
        self.credited_losses += 1.0;
    }

    fn prune_shot_history(&mut self, now_ms: i64) {
        let window = self.kill_credit_window_ms;
        self.shots_by_target.retain(|_, shots| {
            shots.retain(|shot| now_ms - shot.timestamp_ms <= window);
            !shots.is_empty()
        });
    }
}
