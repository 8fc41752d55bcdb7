//! Deterministic mock ranker.

use crate::{DecisionRanker, RankRequest, RankResponse, RankerConfig};

/// Always selects candidate 0. Used for replays and tests where the
/// decision content, not the ranking, is under scrutiny.
#[derive(Debug)]
pub struct MockRanker {
    config: RankerConfig,
}

impl MockRanker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }
}

impl DecisionRanker for MockRanker {
    fn rank_and_explain(&self, request: &RankRequest) -> RankResponse {
        if request.candidate_summaries.is_empty() {
            return RankResponse {
                selected_index: 0,
                explanation: "no candidate decisions available".to_string(),
            };
        }

        RankResponse {
            selected_index: 0,
            explanation: format!(
                "selected candidate 0 with deterministic baseline; model={}",
                self.config.model_name
            ),
        }
    }
}
