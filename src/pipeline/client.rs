use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::{ChatClient, TokenBudget};
use super::PipelineError;

/// HTTP client for an OpenAI-compatible chat-completions service.
///
/// One outbound call per chunk; retry and backoff, if wanted, belong to the
/// orchestrator, not here.
pub struct OpenAiChatClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, PipelineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }
}

/// Request body for /v1/chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from /v1/chat/completions
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatClient for OpenAiChatClient {
    fn complete(
        &self,
        system: &str,
        prompt: &str,
        budget: &TokenBudget,
    ) -> Result<String, PipelineError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: budget.max_tokens,
            temperature: budget.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    PipelineError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    PipelineError::Transport(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    PipelineError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let body = response.text().unwrap_or_default();
            return Err(PipelineError::QuotaExceeded {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PipelineError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| PipelineError::UnparseableResponse(format!("response envelope: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(PipelineError::EmptyResponse);
        }

        Ok(content)
    }
}

/// A scripted reply for `MockChatClient`.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Reply(String),
    QuotaExceeded,
    TransportError(String),
    Empty,
}

/// Mock extraction client for testing — returns scripted replies in order,
/// repeating the final one, and records every prompt it receives.
pub struct MockChatClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

impl MockChatClient {
    /// A client that always returns the same response text.
    pub fn new(response: &str) -> Self {
        Self::with_replies(vec![ScriptedReply::Reply(response.to_string())])
    }

    pub fn with_replies(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl ChatClient for MockChatClient {
    fn complete(
        &self,
        _system: &str,
        prompt: &str,
        _budget: &TokenBudget,
    ) -> Result<String, PipelineError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let reply = {
            let mut replies = self
                .replies
                .lock()
                .map_err(|_| PipelineError::Transport("mock lock poisoned".to_string()))?;
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        };

        match reply {
            Some(ScriptedReply::Reply(text)) => Ok(text),
            Some(ScriptedReply::QuotaExceeded) => Err(PipelineError::QuotaExceeded {
                status: 429,
                body: "rate limit reached".to_string(),
            }),
            Some(ScriptedReply::TransportError(msg)) => Err(PipelineError::Transport(msg)),
            Some(ScriptedReply::Empty) | None => Err(PipelineError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockChatClient::new("test response");
        let result = client
            .complete("system", "prompt", &TokenBudget::default())
            .unwrap();
        assert_eq!(result, "test response");
    }

    #[test]
    fn mock_client_replays_in_order_then_repeats_last() {
        let client = MockChatClient::with_replies(vec![
            ScriptedReply::Reply("first".into()),
            ScriptedReply::Reply("second".into()),
        ]);
        let budget = TokenBudget::default();
        assert_eq!(client.complete("s", "a", &budget).unwrap(), "first");
        assert_eq!(client.complete("s", "b", &budget).unwrap(), "second");
        assert_eq!(client.complete("s", "c", &budget).unwrap(), "second");
    }

    #[test]
    fn mock_client_records_prompts() {
        let client = MockChatClient::new("ok");
        let budget = TokenBudget::default();
        let _ = client.complete("s", "chunk one", &budget);
        let _ = client.complete("s", "chunk two", &budget);
        assert_eq!(client.prompts(), vec!["chunk one", "chunk two"]);
    }

    #[test]
    fn mock_client_scripted_quota_failure() {
        let client = MockChatClient::with_replies(vec![ScriptedReply::QuotaExceeded]);
        let result = client.complete("s", "p", &TokenBudget::default());
        assert!(matches!(
            result,
            Err(PipelineError::QuotaExceeded { status: 429, .. })
        ));
    }

    #[test]
    fn mock_client_scripted_empty_response() {
        let client = MockChatClient::with_replies(vec![ScriptedReply::Empty]);
        let result = client.complete("s", "p", &TokenBudget::default());
        assert!(matches!(result, Err(PipelineError::EmptyResponse)));
    }

    #[test]
    fn openai_client_trims_trailing_slash() {
        let client = OpenAiChatClient::new("https://api.example.com/", "key", "model", 60).unwrap();
        assert_eq!(client.base_url, "https://api.example.com");
        assert_eq!(client.timeout_secs, 60);
    }
}
