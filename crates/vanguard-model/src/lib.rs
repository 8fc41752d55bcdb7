//! Ranker runtime for VANGUARD.
//!
//! The pipeline hands the ranker a memory context plus a short list of
//! candidate decision summaries and receives back a selected index and an
//! explanation. Two backends implement the capability: a deterministic
//! mock and an OpenAI-compatible HTTP endpoint. Ranker failures never
//! leave this crate — every fault degrades to a fallback response.

pub mod http;
pub mod mock;

pub use http::HttpRanker;
pub use mock::MockRanker;

use serde::{Deserialize, Serialize};

/// Which ranking backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankerBackend {
    #[default]
    Mock,
    OpenAiCompatible,
}

/// Ranker construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerConfig {
    pub backend: RankerBackend,
    pub model_name: String,
    pub max_tokens: u32,
    /// Chat-completions endpoint for the HTTP backend.
    pub endpoint: String,
    /// Bearer token; empty means no auth header.
    pub api_key: String,
    pub timeout_ms: u64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            backend: RankerBackend::Mock,
            model_name: "local-1.5b".to_string(),
            max_tokens: 192,
            endpoint: "http://127.0.0.1:8000/v1/chat/completions".to_string(),
            api_key: String::new(),
            timeout_ms: 250,
        }
    }
}

/// One ranking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    /// Newline-joined memory context.
    pub context: String,
    pub candidate_summaries: Vec<String>,
}

/// Ranking result; `selected_index` is always within the candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankResponse {
    pub selected_index: usize,
    pub explanation: String,
}

/// Capability implemented by every ranking backend.
///
/// Implementations are total: any internal failure must surface as a
/// fallback response, never as an error.
pub trait DecisionRanker: Send {
    fn rank_and_explain(&self, request: &RankRequest) -> RankResponse;
}

/// Construct the backend selected by the configuration.
pub fn build_ranker(config: RankerConfig) -> Box<dyn DecisionRanker> {
    match config.backend {
        RankerBackend::Mock => Box::new(MockRanker::new(config)),
        RankerBackend::OpenAiCompatible => Box::new(HttpRanker::new(config)),
    }
}
