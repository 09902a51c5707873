//! Bridges rig-core's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::CompletionModel;
use rig::completion::message::{AssistantContent, Message};
use serde_json::Value;

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

/// Anthropic rejects requests without an explicit token ceiling.
const DEFAULT_MAX_TOKENS: u64 = 1024;

/// `LlmProvider` backed by any rig-core completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    /// Provider-specific request parameters that switch on JSON output.
    json_params: Option<Value>,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            json_params: None,
        }
    }

    /// Extra parameters merged into requests that ask for JSON output.
    pub fn with_json_params(mut self, params: Value) -> Self {
        self.json_params = Some(params);
        self
    }

    fn additional_params(&self, request: &CompletionRequest) -> Option<Value> {
        if request.json_response {
            self.json_params.clone()
        } else {
            None
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let additional_params = self.additional_params(&request);
        let (preamble, mut history) = split_messages(request.messages);
        let prompt = history.pop().ok_or_else(|| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: "completion request has no user message".to_string(),
        })?;

        let mut builder = self
            .model
            .completion_request(prompt)
            .messages(history)
            .max_tokens(request.max_tokens.map(u64::from).unwrap_or(DEFAULT_MAX_TOKENS));
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(params) = additional_params {
            builder = builder.additional_params(params);
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: e.to_string(),
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");
        if content.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.model_name.clone(),
                reason: "response contained no text".to_string(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        })
    }
}

/// Split chat messages into a rig preamble (all system messages joined) and
/// the remaining conversation in order.
fn split_messages(messages: Vec<ChatMessage>) -> (Option<String>, Vec<Message>) {
    let mut system = Vec::new();
    let mut history = Vec::new();
    for msg in messages {
        match msg.role {
            Role::System => system.push(msg.content),
            Role::User => history.push(Message::user(msg.content)),
            Role::Assistant => history.push(Message::assistant(msg.content)),
        }
    }
    let preamble = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    (preamble, history)
}
