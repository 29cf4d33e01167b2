//! Chat transcript reconstruction from persisted log entries
//!
//! A log entry stores the raw request and response bodies. Their shape depends
//! on two flags: whether the call was a chat or a text completion, and whether
//! the response was streamed. [`Exchange::from_entry`] decodes the bodies once
//! into one of four variants; [`Transcript`] is built by matching on it.

use crate::error::{Error, Result};
use crate::log::LogEntry;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Role of a message sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "developer")]
    System,
    User,
    Assistant,
    Tool,
    /// Any role a client sent that is not listed above, e.g. `function`
    #[serde(untagged)]
    Other(String),
}

/// A single role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, deserialize_with = "content_text")]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Message content may be a string, null, or a list of content parts
fn content_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    struct Part {
        #[serde(default)]
        text: Option<String>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Content {
        Text(String),
        Parts(Vec<Part>),
    }

    Ok(match Option::<Content>::deserialize(deserializer)? {
        None => String::new(),
        Some(Content::Text(text)) => text,
        Some(Content::Parts(parts)) => parts.into_iter().filter_map(|p| p.text).collect(),
    })
}

/// Prompt of a text completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Batch(Vec<String>),
    Tokens(Vec<u64>),
}

impl Default for Prompt {
    fn default() -> Self {
        Prompt::Text(String::new())
    }
}

impl Prompt {
    /// Text shown as the user message
    pub fn display_text(&self) -> String {
        match self {
            Prompt::Text(text) => text.clone(),
            Prompt::Batch(parts) => parts.join("\n"),
            Prompt::Tokens(tokens) => tokens
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    model: Option<String>,
    messages: Vec<ChatMessage>,
    #[serde(default)]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionRequest {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt: Prompt,
    #[serde(default)]
    stream: Option<bool>,
}

/// Non-streamed chat completion body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// One streamed chat chunk
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// Text fragment of the first choice; usage-only chunks have none
    pub fn fragment(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .unwrap_or_default()
    }
}

/// Text completion body, also the shape of each streamed completion chunk
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<TextChoice>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextChoice {
    #[serde(default)]
    pub text: String,
}

impl CompletionResponse {
    pub fn fragment(&self) -> &str {
        self.choices.first().map(|c| c.text.as_str()).unwrap_or_default()
    }
}

/// A log entry's request and response, decoded by shape
#[derive(Debug, Clone, PartialEq)]
pub enum Exchange {
    ChatSingle {
        model: String,
        messages: Vec<ChatMessage>,
        response: Option<ChatResponse>,
    },
    ChatStream {
        model: String,
        messages: Vec<ChatMessage>,
        chunks: Option<Vec<ChatChunk>>,
    },
    CompletionSingle {
        model: String,
        prompt: Prompt,
        response: Option<CompletionResponse>,
    },
    CompletionStream {
        model: String,
        prompt: Prompt,
        chunks: Option<Vec<CompletionResponse>>,
    },
}

impl Exchange {
    /// Select the variant from the entry's `chat` flag and the request's
    /// `stream` flag, then decode both bodies into it.
    pub fn from_entry(entry: &LogEntry) -> Result<Self> {
        let fallback_model = || entry.overview.model.clone();

        if entry.overview.chat {
            let request: ChatRequest = decode(&entry.request, "chat request")?;
            let model = request.model.unwrap_or_else(fallback_model);
            if request.stream.unwrap_or(false) {
                Ok(Exchange::ChatStream {
                    model,
                    messages: request.messages,
                    chunks: decode_optional(&entry.response, "chat chunks")?,
                })
            } else {
                Ok(Exchange::ChatSingle {
                    model,
                    messages: request.messages,
                    response: decode_optional(&entry.response, "chat response")?,
                })
            }
        } else {
            let request: CompletionRequest = decode(&entry.request, "completion request")?;
            let model = request.model.unwrap_or_else(fallback_model);
            if request.stream.unwrap_or(false) {
                Ok(Exchange::CompletionStream {
                    model,
                    prompt: request.prompt,
                    chunks: decode_optional(&entry.response, "completion chunks")?,
                })
            } else {
                Ok(Exchange::CompletionSingle {
                    model,
                    prompt: request.prompt,
                    response: decode_optional(&entry.response, "completion response")?,
                })
            }
        }
    }

    pub fn is_streamed(&self) -> bool {
        matches!(
            self,
            Exchange::ChatStream { .. } | Exchange::CompletionStream { .. }
        )
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: &serde_json::Value, what: &str) -> Result<T> {
    T::deserialize(value).map_err(|e| Error::MalformedLog(format!("{}: {}", what, e)))
}

fn decode_optional<T: serde::de::DeserializeOwned>(
    value: &Option<serde_json::Value>,
    what: &str,
) -> Result<Option<T>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => decode(value, what).map(Some),
    }
}

/// How far the logged exchange got
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptStatus {
    /// The response is present and produced an assistant message
    Complete,
    /// No response was recorded (still running, or the call failed)
    Pending,
    /// The upstream answered with an error body instead of choices
    UpstreamError(String),
}

/// Ordered messages reconstructed from one log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Model named in the request; used as the assistant's display name
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub status: TranscriptStatus,
}

impl Transcript {
    /// Rebuild the transcript of a retrieved entry. `None` means the entry
    /// could not be retrieved.
    pub fn reconstruct(entry: Option<&LogEntry>) -> Result<Self> {
        let entry = entry.ok_or(Error::NoData)?;
        let exchange = Exchange::from_entry(entry)?;
        debug!(
            log_id = %entry.overview.id,
            chat = entry.overview.chat,
            streamed = exchange.is_streamed(),
            "Reconstructing transcript"
        );
        Ok(Self::from_exchange(exchange))
    }

    pub fn from_exchange(exchange: Exchange) -> Self {
        match exchange {
            Exchange::ChatSingle {
                model,
                messages,
                response,
            } => {
                let mut transcript = Self::seed(model, messages);
                match response {
                    None => {}
                    Some(response) => match response.choices.into_iter().next() {
                        Some(choice) => transcript.finish(choice.message),
                        None => transcript.status = upstream_error(response.error),
                    },
                }
                transcript
            }
            Exchange::ChatStream {
                model,
                messages,
                chunks,
            } => {
                let mut transcript = Self::seed(model, messages);
                if let Some(chunks) = chunks {
                    let content: String = chunks.iter().map(ChatChunk::fragment).collect();
                    transcript.finish(ChatMessage::assistant(content));
                }
                transcript
            }
            Exchange::CompletionSingle {
                model,
                prompt,
                response,
            } => {
                let mut transcript = Self::seed_prompt(model, &prompt);
                match response {
                    None => {}
                    Some(response) => match response.choices.into_iter().next() {
                        Some(choice) => transcript.finish(ChatMessage::assistant(choice.text)),
                        None => transcript.status = upstream_error(response.error),
                    },
                }
                transcript
            }
            Exchange::CompletionStream {
                model,
                prompt,
                chunks,
            } => {
                let mut transcript = Self::seed_prompt(model, &prompt);
                if let Some(chunks) = chunks {
                    let content: String =
                        chunks.iter().map(CompletionResponse::fragment).collect();
                    transcript.finish(ChatMessage::assistant(content));
                }
                transcript
            }
        }
    }

    fn seed(model: String, messages: Vec<ChatMessage>) -> Self {
        Self {
            model,
            messages,
            status: TranscriptStatus::Pending,
        }
    }

    fn seed_prompt(model: String, prompt: &Prompt) -> Self {
        Self::seed(model, vec![ChatMessage::user(prompt.display_text())])
    }

    fn finish(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.status = TranscriptStatus::Complete;
    }

    /// Display name of a role: "System", "You", the model for the assistant.
    /// Unknown roles are shown as sent.
    pub fn speaker<'a>(&'a self, role: &'a Role) -> &'a str {
        match role {
            Role::System => "System",
            Role::User => "You",
            Role::Assistant if self.model.is_empty() => "Bot",
            Role::Assistant => &self.model,
            Role::Tool => "Tool",
            Role::Other(name) => name,
        }
    }
}

fn upstream_error(error: Option<serde_json::Value>) -> TranscriptStatus {
    let message = match error {
        Some(serde_json::Value::String(message)) => message,
        Some(error) => error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        None => "response contained no choices".to_string(),
    };
    TranscriptStatus::UpstreamError(message)
}
