//! Core types and definitions for the VANGUARD decision agent.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, entities, weapons, decision records, events, and constants.
//! It has no dependency on any I/O or runtime framework.

pub mod constants;
pub mod decision;
pub mod entity;
pub mod enums;
pub mod events;
pub mod loadout;
pub mod types;
