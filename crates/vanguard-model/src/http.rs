//! OpenAI-compatible HTTP ranker backend.
//!
//! Posts a chat-completions request embedding the memory context and the
//! numbered candidate list, then digs `selected_index` / `explanation` out
//! of the returned message content. Any failure along the way — transport,
//! timeout, missing fields, unparseable content — degrades to candidate 0
//! with a diagnostic explanation.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::{DecisionRanker, RankRequest, RankResponse, RankerConfig};

#[derive(Error, Debug)]
pub(crate) enum RankerError {
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http client unavailable")]
    ClientUnavailable,

    #[error("response carries no message content")]
    MissingContent,

    #[error("bad ranking payload: {0}")]
    BadPayload(String),
}

pub struct HttpRanker {
    config: RankerConfig,
    client: Option<Client>,
}

impl HttpRanker {
    pub fn new(config: RankerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok();
        Self { config, client }
    }

    fn rank_remote(&self, request: &RankRequest) -> Result<RankResponse, RankerError> {
        let client = self.client.as_ref().ok_or(RankerError::ClientUnavailable)?;

        let body = serde_json::json!({
            "model": self.config.model_name,
            "messages": [
                {
                    "role": "system",
                    "content": "你是战术决策排序助手，只输出一个JSON对象。",
                },
                {
                    "role": "user",
                    "content": build_prompt(request),
                },
            ],
            "temperature": 0.1,
            "max_tokens": self.config.max_tokens,
        });

        let mut post = client.post(&self.config.endpoint).json(&body);
        if !self.config.api_key.is_empty() {
            post = post.bearer_auth(&self.config.api_key);
        }

        let text = post.send()?.text()?;
        let content = extract_message_content(&text)?;
        extract_ranking(&content, request.candidate_summaries.len())
    }
}

impl DecisionRanker for HttpRanker {
    fn rank_and_explain(&self, request: &RankRequest) -> RankResponse {
        if request.candidate_summaries.is_empty() {
            return RankResponse {
                selected_index: 0,
                explanation: "no candidate decisions available".to_string(),
            };
        }

        match self.rank_remote(request) {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "ranker fallback to candidate 0");
                RankResponse {
                    selected_index: 0,
                    explanation: format!("ranker fallback: {err}"),
                }
            }
        }
    }
}

/// Assemble the user prompt: memory context plus numbered candidates plus
/// the output-shape instruction.
fn build_prompt(request: &RankRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str("近期战场记忆:\n");
    prompt.push_str(&request.context);
    prompt.push_str("\n候选决策:\n");
    for (index, candidate) in request.candidate_summaries.iter().enumerate() {
        prompt.push_str(&format!("{index}. {candidate}\n"));
    }
    prompt.push_str("请选择最优候选，返回 {\"selected_index\": <int>, \"explanation\": \"<原因>\"}");
    prompt
}

/// Pull `choices[0].message.content` out of a chat-completions response.
fn extract_message_content(response_text: &str) -> Result<String, RankerError> {
    let value: Value = serde_json::from_str(response_text)
        .map_err(|e| RankerError::BadPayload(format!("response is not JSON: {e}")))?;
    value["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or(RankerError::MissingContent)
}

/// Parse the JSON object embedded in the model's content text.
fn extract_ranking(content: &str, candidate_count: usize) -> Result<RankResponse, RankerError> {
    let start = content
        .find('{')
        .ok_or_else(|| RankerError::BadPayload("no JSON object in content".to_string()))?;
    let end = content
        .rfind('}')
        .ok_or_else(|| RankerError::BadPayload("no JSON object in content".to_string()))?;
    if end < start {
        return Err(RankerError::BadPayload("malformed JSON object".to_string()));
    }

    let value: Value = serde_json::from_str(&content[start..=end])
        .map_err(|e| RankerError::BadPayload(format!("embedded JSON: {e}")))?;

    let selected = value["selected_index"]
        .as_u64()
        .ok_or_else(|| RankerError::BadPayload("selected_index missing".to_string()))?
        as usize;
    if selected >= candidate_count {
        return Err(RankerError::BadPayload(format!(
            "selected_index {selected} out of range for {candidate_count} candidates"
        )));
    }

    let explanation = value["explanation"]
        .as_str()
        .unwrap_or("no explanation returned")
        .to_string();

    Ok(RankResponse {
        selected_index: selected,
        explanation,
    })
}
