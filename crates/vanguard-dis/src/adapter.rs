//! Stateful DIS adapter.
//!
//! Owns the keyed entity table, the latest environment report, and the
//! outbound fire-event buffer. Snapshots handed out by [`DisAdapter::poll`]
//! are value copies and never mutated afterwards.

use std::collections::HashMap;

use tracing::debug;

use vanguard_core::entity::{BattlefieldSnapshot, EntityState, EnvironmentState};
use vanguard_core::enums::{EventType, Side};
use vanguard_core::events::EventRecord;
use vanguard_core::loadout::default_loadout;

use crate::pdu::{DisEntityPdu, DisPduBatch};

#[derive(Debug, Default)]
pub struct DisAdapter {
    entities: HashMap<String, EntityState>,
    env: EnvironmentState,
    latest_timestamp_ms: i64,
    dirty: bool,
    buffered_events: Vec<EventRecord>,
}

impl DisAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one PDU batch: upsert entities, buffer fire events, and
    /// advance the latest-seen timestamp.
    pub fn ingest(&mut self, batch: &DisPduBatch) {
        if let Some(env) = batch.env {
            self.env = env;
            self.dirty = true;
        }

        for update in &batch.entity_updates {
            self.upsert_entity(update);
            self.latest_timestamp_ms = self.latest_timestamp_ms.max(update.timestamp_ms);
            self.dirty = true;
        }

        for fire in &batch.fire_events {
            self.buffered_events.push(EventRecord {
                timestamp_ms: fire.timestamp_ms,
                event_type: EventType::WeaponFire,
                actor_id: fire.shooter_id.clone(),
                pose: fire.origin,
                message: format!("武器={}，目标={}", fire.weapon_name, fire.target_id),
            });
            self.latest_timestamp_ms = self.latest_timestamp_ms.max(fire.timestamp_ms);
            self.dirty = true;
        }

        self.latest_timestamp_ms = self.latest_timestamp_ms.max(batch.timestamp_ms);

        debug!(
            entities = batch.entity_updates.len(),
            fires = batch.fire_events.len(),
            timestamp_ms = batch.timestamp_ms,
            "ingested PDU batch"
        );
    }

    /// Bulk-replace the entity table from a prebuilt snapshot.
    pub fn feed_mock_frame(&mut self, snapshot: &BattlefieldSnapshot) {
        self.entities.clear();
        for unit in snapshot
            .friendly_units
            .iter()
            .chain(snapshot.hostile_units.iter())
        {
            self.entities.insert(unit.id.clone(), unit.clone());
        }
        self.env = snapshot.env;
        self.latest_timestamp_ms = snapshot.timestamp_ms;
        self.dirty = true;
    }

    /// Return a fresh snapshot when new data arrived since the last poll.
    pub fn poll(&mut self) -> Option<BattlefieldSnapshot> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.build_snapshot())
    }

    /// Return and clear the buffered fire events.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.buffered_events)
    }

    fn upsert_entity(&mut self, update: &DisEntityPdu) {
        match self.entities.get_mut(&update.entity_id) {
            Some(existing) => {
                existing.side = update.side;
                existing.unit_type = update.unit_type;
                existing.pose = update.pose;
                existing.speed_mps = update.speed_mps;
                existing.heading_deg = update.heading_deg;
                existing.alive = update.alive;
                existing.threat_level = update.threat_level;
                // Weapon state survives position updates.
            }
            None => {
                self.entities.insert(
                    update.entity_id.clone(),
                    EntityState {
                        id: update.entity_id.clone(),
                        side: update.side,
                        unit_type: update.unit_type,
                        pose: update.pose,
                        speed_mps: update.speed_mps,
                        heading_deg: update.heading_deg,
                        threat_level: update.threat_level,
                        alive: update.alive,
                        formation_group: None,
                        weapons: default_loadout(update.unit_type),
                    },
                );
            }
        }
    }

    /// Partition the entity table by side. Neutral entities are dropped;
    /// lists are sorted by id so a fixed ingestion sequence yields a fixed
    /// snapshot.
    fn build_snapshot(&self) -> BattlefieldSnapshot {
        let mut friendly_units = Vec::new();
        let mut hostile_units = Vec::new();
        for unit in self.entities.values() {
            match unit.side {
                Side::Friendly => friendly_units.push(unit.clone()),
                Side::Hostile => hostile_units.push(unit.clone()),
                Side::Neutral => {}
            }
        }
        friendly_units.sort_by(|a, b| a.id.cmp(&b.id));
        hostile_units.sort_by(|a, b| a.id.cmp(&b.id));

        BattlefieldSnapshot {
            timestamp_ms: self.latest_timestamp_ms,
            friendly_units,
            hostile_units,
            env: self.env,
        }
    }
}
