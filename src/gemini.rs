//! Gemini text-generation client
//!
//! The rest of the crate talks to the model through [`TextGenerator`], which
//! takes a prompt and returns raw text. Any structure in the reply is the
//! caller's problem.

use crate::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Credential value shipped in sample `.env` files; treated as unset.
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> ServiceResult<String>;
}

pub type SharedGenerator = Arc<dyn TextGenerator>;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

pub struct GeminiClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            agent,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.api_base.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> ServiceResult<String> {
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .agent
            .post(&self.endpoint)
            .set("x-goog-api-key", &self.api_key)
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => ServiceError::ApiError(format!(
                    "Gemini returned HTTP {}: {}",
                    code,
                    resp.into_string().unwrap_or_default()
                )),
                ureq::Error::Transport(t) => {
                    ServiceError::NetworkError(format!("Failed to reach Gemini: {}", t))
                }
            })?;

        let parsed: GenerateResponse = response
            .into_json()
            .map_err(|e| ServiceError::NetworkError(format!("Failed to read response: {}", e)))?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateResponse) -> ServiceResult<String> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| ServiceError::ApiError("Gemini response has no candidates".to_string()))?;
    Ok(content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<String>())
}

/// Build a client when a usable credential is present. Absent, blank and
/// placeholder keys all leave the AI disabled.
pub fn create_generator(
    api_key: Option<&str>,
    model: &str,
    api_base: &str,
    timeout: Duration,
) -> Option<SharedGenerator> {
    let key = api_key.map(str::trim).filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)?;
    let client = GeminiClient::new(GeminiConfig {
        api_key: key.to_string(),
        model: model.to_string(),
        api_base: api_base.to_string(),
        timeout,
    });
    tracing::info!(endpoint = client.endpoint(), "Gemini client configured");
    Some(Arc::new(client))
}

/// Slice from the first `[` to the last `]`, inclusive.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a canned reply and records every prompt it sees.
    pub struct ScriptedGenerator {
        reply: Result<String, String>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, prompt: &str) -> ServiceResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(ServiceError::NetworkError)
        }
    }
}
