//! The VANGUARD decision pipeline.
//!
//! `AgentPipeline` owns the event memory, the fire-control and maneuver
//! engines, the decision cache, and a ranker backend, and turns each
//! battlefield snapshot into a `DecisionPackage`. Completely synchronous;
//! one instance serves one stream of ticks.

pub mod cache;
pub mod fire_control;
pub mod fusion;
pub mod maneuver;
pub mod memory;
pub mod metrics;
pub mod pipeline;

pub use cache::DecisionCache;
pub use fire_control::{FireControlConfig, FireControlEngine};
pub use maneuver::{ManeuverConfig, ManeuverEngine};
pub use memory::EventMemory;
pub use metrics::{ReplayMetricsEvaluator, ReplayMetricsResult};
pub use pipeline::{AgentPipeline, PipelineConfig};

#[cfg(test)]
mod tests;
