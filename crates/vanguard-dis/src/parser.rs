//! DIS binary stream parser.
//!
//! The wire format is big-endian: a 12-byte header (version, exercise,
//! pdu_type, family, u32 timestamp, u16 length, u16 padding) followed by a
//! typed body. Entity-state bodies are at least 88 bytes, fire bodies at
//! least 64; trailing bytes up to the declared length are ignored.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::Path;

use crate::error::{DisError, Result};
use crate::pdu::{DisEntityPdu, DisFirePdu, DisPduBatch};

use vanguard_core::enums::{Side, UnitType};
use vanguard_core::types::Pose;

const HEADER_LEN: usize = 12;
const ENTITY_PDU_MIN_LEN: usize = 88;
const FIRE_PDU_MIN_LEN: usize = 64;

const PDU_TYPE_ENTITY_STATE: u8 = 1;
const PDU_TYPE_FIRE: u8 = 2;

/// Decoded 12-byte PDU header.
#[derive(Debug, Clone, Copy)]
pub struct DisPduHeader {
    pub protocol_version: u8,
    pub exercise_id: u8,
    pub pdu_type: u8,
    pub protocol_family: u8,
    pub timestamp: u32,
    /// Total PDU length in bytes, header inclusive.
    pub length: u16,
    pub padding: u16,
}

/// Parse a binary replay file into timestamp-ordered batches.
pub fn parse_file(path: &Path) -> Result<Vec<DisPduBatch>> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    parse_bytes(&bytes)
}

/// Parse a contiguous byte buffer into timestamp-ordered batches.
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<DisPduBatch>> {
    let mut by_timestamp: BTreeMap<u32, DisPduBatch> = BTreeMap::new();

    let mut offset = 0usize;
    while offset < bytes.len() {
        if bytes.len() - offset < HEADER_LEN {
            return Err(DisError::protocol(offset, "incomplete DIS header"));
        }

        let header = parse_header(bytes, offset);
        let length = header.length as usize;
        if length < HEADER_LEN {
            return Err(DisError::protocol(offset, "PDU length below header size"));
        }
        if offset + length > bytes.len() {
            return Err(DisError::protocol(offset, "PDU length exceeds buffer"));
        }

        let batch = by_timestamp.entry(header.timestamp).or_insert_with(|| DisPduBatch {
            timestamp_ms: i64::from(header.timestamp),
            ..DisPduBatch::default()
        });

        match header.pdu_type {
            PDU_TYPE_ENTITY_STATE => {
                batch.entity_updates.push(parse_entity_state_pdu(bytes, offset, length)?);
            }
            PDU_TYPE_FIRE => {
                batch.fire_events.push(parse_fire_pdu(bytes, offset, length)?);
            }
            other => {
                return Err(DisError::protocol(
                    offset,
                    format!("unsupported PDU type {other}"),
                ));
            }
        }

        offset += length;
    }

    Ok(by_timestamp.into_values().collect())
}

fn parse_header(bytes: &[u8], offset: usize) -> DisPduHeader {
    DisPduHeader {
        protocol_version: bytes[offset],
        exercise_id: bytes[offset + 1],
        pdu_type: bytes[offset + 2],
        protocol_family: bytes[offset + 3],
        timestamp: read_u32_be(bytes, offset + 4),
        length: read_u16_be(bytes, offset + 8),
        padding: read_u16_be(bytes, offset + 10),
    }
}

fn parse_entity_state_pdu(bytes: &[u8], offset: usize, length: usize) -> Result<DisEntityPdu> {
    if length < ENTITY_PDU_MIN_LEN {
        return Err(DisError::protocol(offset, "entity-state PDU too short"));
    }

    let header = parse_header(bytes, offset);

    let vx = f64::from(read_f32_be(bytes, offset + 36));
    let vy = f64::from(read_f32_be(bytes, offset + 40));
    let vz = f64::from(read_f32_be(bytes, offset + 44));
    let speed_mps = (vx * vx + vy * vy + vz * vz).sqrt();

    let pose = Pose::new(
        read_f64_be(bytes, offset + 48),
        read_f64_be(bytes, offset + 56),
        read_f64_be(bytes, offset + 64),
    );

    let psi_rad = f64::from(read_f32_be(bytes, offset + 72));
    let heading_deg = psi_rad * (180.0 / PI);

    let appearance = read_u32_be(bytes, offset + 84);
    let damage = (appearance >> 3) & 0x3;
    let alive = damage != 3;

    let unit_type = parse_unit_type(bytes, offset + 20);
    let threat_level = (base_threat(unit_type) + speed_mps * 0.01).clamp(0.0, 1.0);

    Ok(DisEntityPdu {
        timestamp_ms: i64::from(header.timestamp),
        entity_id: parse_entity_id(bytes, offset + 12),
        side: parse_force_id(bytes[offset + 18]),
        unit_type,
        pose,
        speed_mps,
        heading_deg,
        alive,
        threat_level,
    })
}

fn parse_fire_pdu(bytes: &[u8], offset: usize, length: usize) -> Result<DisFirePdu> {
    if length < FIRE_PDU_MIN_LEN {
        return Err(DisError::protocol(offset, "fire PDU too short"));
    }

    let header = parse_header(bytes, offset);
    Ok(DisFirePdu {
        timestamp_ms: i64::from(header.timestamp),
        shooter_id: parse_entity_id(bytes, offset + 12),
        target_id: parse_entity_id(bytes, offset + 18),
        weapon_name: "munition".to_string(),
        origin: Pose::new(
            read_f64_be(bytes, offset + 40),
            read_f64_be(bytes, offset + 48),
            read_f64_be(bytes, offset + 56),
        ),
    })
}

/// Render the u16 triple (site, application, entity) as `"s-a-e"`.
fn parse_entity_id(bytes: &[u8], offset: usize) -> String {
    let site = read_u16_be(bytes, offset);
    let app = read_u16_be(bytes, offset + 2);
    let entity = read_u16_be(bytes, offset + 4);
    format!("{site}-{app}-{entity}")
}

fn parse_force_id(force_id: u8) -> Side {
    match force_id {
        1 => Side::Friendly,
        2 => Side::Hostile,
        _ => Side::Neutral,
    }
}

/// Derive the coarse unit category from the 7-byte DIS entity type record
/// (kind, domain, country, category, subcategory, specific, extra).
fn parse_unit_type(bytes: &[u8], offset: usize) -> UnitType {
    let kind = bytes[offset];
    let domain = bytes[offset + 1];
    let category = bytes[offset + 4];

    if kind != 1 {
        return UnitType::Unknown;
    }

    if domain == 1 {
        return match category {
            0..=3 => UnitType::Armor,
            4..=6 => UnitType::Artillery,
            7..=9 => UnitType::Infantry,
            _ => UnitType::Unknown,
        };
    }
    if domain == 2 || domain == 4 {
        return UnitType::AirDefense;
    }
    UnitType::Unknown
}

fn base_threat(unit_type: UnitType) -> f64 {
    match unit_type {
        UnitType::Armor => 0.9,
        UnitType::Artillery => 0.85,
        UnitType::AirDefense => 0.8,
        UnitType::Command => 0.75,
        UnitType::Infantry => 0.55,
        UnitType::Unknown => 0.3,
    }
}

fn read_u16_be(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32_be(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_f32_be(bytes: &[u8], offset: usize) -> f32 {
    f32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_f64_be(bytes: &[u8], offset: usize) -> f64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    f64::from_be_bytes(raw)
}
