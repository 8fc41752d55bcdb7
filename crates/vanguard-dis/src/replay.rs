//! Text scenario replay loader.
//!
//! One record per line, `#` comments and blank lines skipped, fields
//! comma-separated and trimmed of ASCII whitespace:
//!
//! ```text
//! ENV,ts,visibility,weather_risk,terrain_risk
//! ENTITY,ts,id,side,type,x,y,z,speed,heading,alive,threat
//! FIRE,ts,shooter,target,weapon,x,y,z
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{DisError, Result};
use crate::pdu::{DisEntityPdu, DisFirePdu, DisPduBatch};

use vanguard_core::entity::EnvironmentState;
use vanguard_core::enums::{Side, UnitType};
use vanguard_core::types::Pose;

/// Load a text replay file into timestamp-ordered batches.
pub fn load_batches(path: &Path) -> Result<Vec<DisPduBatch>> {
    let text = std::fs::read_to_string(path)?;
    parse_records(&text)
}

/// Parse replay text into timestamp-ordered batches.
pub fn parse_records(text: &str) -> Result<Vec<DisPduBatch>> {
    let mut by_timestamp: BTreeMap<i64, DisPduBatch> = BTreeMap::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match fields[0] {
            "ENV" => {
                if fields.len() != 5 {
                    return Err(DisError::format(line_no, "ENV record needs 5 fields"));
                }
                let ts = parse_i64(fields[1], "timestamp", line_no)?;
                let env = EnvironmentState {
                    visibility_m: parse_f64(fields[2], "visibility_m", line_no)?,
                    weather_risk: parse_f64(fields[3], "weather_risk", line_no)?,
                    terrain_risk: parse_f64(fields[4], "terrain_risk", line_no)?,
                };
                batch_for(&mut by_timestamp, ts).env = Some(env);
            }
            "ENTITY" => {
                if fields.len() != 12 {
                    return Err(DisError::format(line_no, "ENTITY record needs 12 fields"));
                }
                let ts = parse_i64(fields[1], "timestamp", line_no)?;
                let pdu = DisEntityPdu {
                    timestamp_ms: ts,
                    entity_id: fields[2].to_string(),
                    side: parse_side(fields[3], line_no)?,
                    unit_type: parse_unit_type(fields[4], line_no)?,
                    pose: Pose::new(
                        parse_f64(fields[5], "x", line_no)?,
                        parse_f64(fields[6], "y", line_no)?,
                        parse_f64(fields[7], "z", line_no)?,
                    ),
                    speed_mps: parse_f64(fields[8], "speed_mps", line_no)?,
                    heading_deg: parse_f64(fields[9], "heading_deg", line_no)?,
                    alive: parse_bool(fields[10], "alive", line_no)?,
                    threat_level: parse_f64(fields[11], "threat_level", line_no)?,
                };
                batch_for(&mut by_timestamp, ts).entity_updates.push(pdu);
            }
            "FIRE" => {
                if fields.len() != 8 {
                    return Err(DisError::format(line_no, "FIRE record needs 8 fields"));
                }
                let ts = parse_i64(fields[1], "timestamp", line_no)?;
                let pdu = DisFirePdu {
                    timestamp_ms: ts,
                    shooter_id: fields[2].to_string(),
                    target_id: fields[3].to_string(),
                    weapon_name: fields[4].to_string(),
                    origin: Pose::new(
                        parse_f64(fields[5], "x", line_no)?,
                        parse_f64(fields[6], "y", line_no)?,
                        parse_f64(fields[7], "z", line_no)?,
                    ),
                };
                batch_for(&mut by_timestamp, ts).fire_events.push(pdu);
            }
            other => {
                return Err(DisError::format(
                    line_no,
                    format!("unknown record type {other}"),
                ));
            }
        }
    }

    Ok(by_timestamp.into_values().collect())
}

fn batch_for(by_timestamp: &mut BTreeMap<i64, DisPduBatch>, ts: i64) -> &mut DisPduBatch {
    by_timestamp.entry(ts).or_insert_with(|| DisPduBatch {
        timestamp_ms: ts,
        ..DisPduBatch::default()
    })
}

fn parse_i64(text: &str, field: &str, line_no: usize) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| DisError::format(line_no, format!("invalid int64 for {field}")))
}

fn parse_f64(text: &str, field: &str, line_no: usize) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| DisError::format(line_no, format!("invalid double for {field}")))
}

fn parse_bool(text: &str, field: &str, line_no: usize) -> Result<bool> {
    match text {
        "1" | "true" | "TRUE" => Ok(true),
        "0" | "false" | "FALSE" => Ok(false),
        _ => Err(DisError::format(line_no, format!("invalid bool for {field}"))),
    }
}

fn parse_side(text: &str, line_no: usize) -> Result<Side> {
    match text {
        "friendly" => Ok(Side::Friendly),
        "hostile" => Ok(Side::Hostile),
        "neutral" => Ok(Side::Neutral),
        other => Err(DisError::format(line_no, format!("unknown side {other}"))),
    }
}

fn parse_unit_type(text: &str, line_no: usize) -> Result<UnitType> {
    match text {
        "infantry" => Ok(UnitType::Infantry),
        "armor" => Ok(UnitType::Armor),
        "artillery" => Ok(UnitType::Artillery),
        "air_defense" => Ok(UnitType::AirDefense),
        "command" => Ok(UnitType::Command),
        other => Err(DisError::format(
            line_no,
            format!("unknown unit type {other}"),
        )),
    }
}
