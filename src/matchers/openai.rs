use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::MatcherError;
use crate::matchers::{EntryMatcher, MatchPair, MatchRequest};

/// System prompt for the alignment task. The model sees absolute index tags
/// and must return them verbatim.
const SYSTEM_PROMPT: &str = "You are a subtitle alignment tool. Match target subtitle entries \
to their corresponding reference subtitle entries based on meaning/content.\n\n\
Rules:\n\
- Each target entry should match exactly one reference entry\n\
- Match by semantic meaning, not by position\n\
- If no good match exists, skip that entry\n\
- Return ONLY a JSON array of matches\n\
- Format: [{\"tgt\": <TGT-index>, \"ref\": <REF-index>}, ...]\n\
- Use the exact index numbers shown in brackets";

/// Entry matcher backed by an OpenAI-compatible chat completions API
#[derive(Debug)]
pub struct OpenAiMatcher {
    /// Base URL of the API (e.g. https://api.openai.com/v1)
    endpoint: String,
    /// API key, empty for local servers
    api_key: String,
    /// Model name
    model: String,
    /// HTTP client for making requests
    client: Client,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    /// Role of the message sender (system, user or assistant)
    role: String,
    /// Content of the message
    content: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    /// Model name to use
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Sampling temperature; low for deterministic matching
    temperature: f32,
    /// Format to return a response in
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Response format constraint
#[derive(Debug, Serialize)]
struct ResponseFormat {
    /// Format type identifier
    #[serde(rename = "type")]
    format_type: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    /// Completion choices
    choices: Vec<ChatChoice>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// Response message
    message: ChatMessage,
}

impl OpenAiMatcher {
    /// Create a new matcher client
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Build the user prompt: reference window with timing, target group without
    fn build_user_prompt(request: &MatchRequest) -> String {
        let ref_text = request
            .reference
            .iter()
            .map(|e| format!("[REF-{}] ({}) {}", e.tag, e.timestamp, e.text))
            .collect::<Vec<_>>()
            .join("\n");

        let target_text = request
            .targets
            .iter()
            .map(|e| format!("[TGT-{}] {}", e.tag, e.text))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Reference subtitles (with timing):\n{}\n\n\
             Target subtitles (timing may be wrong):\n{}\n\n\
             Match each target entry to its reference equivalent. Return JSON array only.",
            ref_text, target_text
        )
    }

    /// Parse the model's content into match pairs, tolerating shape drift.
    ///
    /// Accepts a bare array, a {"matches": [...]} or {"results": [...]} wrapper,
    /// or the first array value found in a wrapping object. Entries without
    /// integer "tgt"/"ref" fields are dropped. An unparseable body yields zero
    /// pairs rather than an error - a failed validation is not fatal.
    pub fn parse_match_content(content: &str) -> Vec<MatchPair> {
        let parsed: serde_json::Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(e) => {
                debug!("Matcher response is not valid JSON: {}", e);
                return Vec::new();
            }
        };

        let raw_matches = match &parsed {
            serde_json::Value::Array(items) => items.clone(),
            serde_json::Value::Object(map) => map
                .get("matches")
                .or_else(|| map.get("results"))
                .and_then(|v| v.as_array())
                .cloned()
                .or_else(|| {
                    // Fall back to the first array value in the object
                    map.values().find_map(|v| v.as_array().cloned())
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        raw_matches
            .iter()
            .filter_map(|m| {
                let target_idx = m.get("tgt").and_then(|v| v.as_u64())?;
                let ref_idx = m.get("ref").and_then(|v| v.as_u64())?;
                Some(MatchPair {
                    target_idx: target_idx as usize,
                    ref_idx: ref_idx as usize,
                })
            })
            .collect()
    }
}

#[async_trait]
impl EntryMatcher for OpenAiMatcher {
    async fn match_entries(&self, request: &MatchRequest) -> Result<Vec<MatchPair>, MatcherError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_user_prompt(request),
                },
            ],
            temperature: 0.1,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let mut http_request = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            http_request = http_request.bearer_auth(&self.api_key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| MatcherError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Matcher API error ({}): {}", status, error_text);
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(MatcherError::AuthenticationError(error_text));
            }
            return Err(MatcherError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| MatcherError::ParseError(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");

        let pairs = Self::parse_match_content(content);
        debug!("Matcher returned {} pairs", pairs.len());
        Ok(pairs)
    }
}
