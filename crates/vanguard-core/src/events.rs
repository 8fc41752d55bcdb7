//! Tactical event records held by the event memory.

use serde::{Deserialize, Serialize};

use crate::enums::EventType;
use crate::types::Pose;

/// One timestamped tactical event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp_ms: i64,
    pub event_type: EventType,
    pub actor_id: String,
    pub pose: Pose,
    pub message: String,
}
