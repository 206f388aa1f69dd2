//! Chat-completion client abstraction and the OpenAI adapter.
//!
//! Answer generation is grounded: the request carries the retrieved report
//! excerpts as a system message, replays the prior conversation turns, and
//! asks the current question last. Sampling is deterministic (temperature 0).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Errors raised by the chat-completion service.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP layer failed before a response was received.
    #[error("Chat completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Service responded with a non-success status.
    #[error("Chat service returned {status}: {body}")]
    Api {
        /// HTTP status from the chat endpoint.
        status: StatusCode,
        /// Response body associated with the failure.
        body: String,
    },
    /// Service returned no answer text.
    #[error("Chat service returned an empty completion")]
    EmptyResponse,
}

/// One completed conversation exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// The question the user asked.
    pub question: String,
    /// The answer that was produced for it.
    pub answer: String,
}

/// A grounded-generation request: question, supporting excerpts, and history.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The current natural-language question.
    pub question: String,
    /// Retrieved chunk texts the answer must be grounded in.
    pub context: Vec<String>,
    /// Prior conversation turns, oldest first.
    pub history: Vec<ChatTurn>,
}

/// Interface implemented by answer-generation backends.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Produce a grounded answer for the request.
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError>;
}

/// Chat client for the OpenAI `/v1/chat/completions` endpoint.
pub struct OpenAiChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

impl OpenAiChatClient {
    /// Build a client from the session configuration.
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        let client = Client::builder().user_agent("reportqa/0.1").build()?;
        Ok(Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.chat_model.clone(),
        })
    }
}

/// Build the message list for a grounded-generation request.
fn build_messages(request: &ChatRequest) -> Vec<Message> {
    let mut messages = Vec::with_capacity(request.history.len() * 2 + 2);
    messages.push(Message {
        role: "system".to_string(),
        content: system_prompt(&request.context),
    });
    for turn in &request.history {
        messages.push(Message {
            role: "user".to_string(),
            content: turn.question.clone(),
        });
        messages.push(Message {
            role: "assistant".to_string(),
            content: turn.answer.clone(),
        });
    }
    messages.push(Message {
        role: "user".to_string(),
        content: request.question.clone(),
    });
    messages
}

fn system_prompt(context: &[String]) -> String {
    let mut prompt = String::from(
        "You are a financial analysis assistant. Answer the user's question \
         using only the report excerpts below. If the excerpts do not contain \
         the answer, say that the report does not cover it.\n\nExcerpts:\n",
    );
    for (index, excerpt) in context.iter().enumerate() {
        prompt.push_str(&format!("\n[{}] {}\n", index + 1, excerpt));
    }
    prompt
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        tracing::debug!(
            model = %self.model,
            context_chunks = request.context.len(),
            history_turns = request.history.len(),
            "Requesting chat completion"
        );
        let body = CompletionRequest {
            model: self.model.clone(),
            temperature: 0.0,
            messages: build_messages(request),
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let payload: CompletionResponse = response.json().await?;
        let answer = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        if answer.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_replay_history_in_order() {
        let request = ChatRequest {
            question: "How did it compare to last year?".to_string(),
            context: vec!["Revenue was $10M.".to_string()],
            history: vec![ChatTurn {
                question: "What was total revenue?".to_string(),
                answer: "$10M.".to_string(),
            }],
        };

        let messages = build_messages(&request);
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[1].content, "What was total revenue?");
        assert_eq!(messages[3].content, "How did it compare to last year?");
    }

    #[test]
    fn system_prompt_embeds_all_excerpts() {
        let prompt = system_prompt(&["first excerpt".to_string(), "second excerpt".to_string()]);
        assert!(prompt.contains("[1] first excerpt"));
        assert!(prompt.contains("[2] second excerpt"));
    }
}
