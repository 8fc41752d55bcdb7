//! Decoded PDU records and timestamp-keyed batches.

use serde::{Deserialize, Serialize};

use vanguard_core::entity::EnvironmentState;
use vanguard_core::enums::{Side, UnitType};
use vanguard_core::types::Pose;

/// One decoded entity-state PDU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisEntityPdu {
    pub timestamp_ms: i64,
    pub entity_id: String,
    pub side: Side,
    pub unit_type: UnitType,
    pub pose: Pose,
    pub speed_mps: f64,
    pub heading_deg: f64,
    pub alive: bool,
    pub threat_level: f64,
}

/// One decoded fire PDU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisFirePdu {
    pub timestamp_ms: i64,
    pub shooter_id: String,
    pub target_id: String,
    pub weapon_name: String,
    pub origin: Pose,
}

/// All PDUs sharing one timestamp, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisPduBatch {
    pub timestamp_ms: i64,
    pub entity_updates: Vec<DisEntityPdu>,
    pub fire_events: Vec<DisFirePdu>,
    pub env: Option<EnvironmentState>,
}
