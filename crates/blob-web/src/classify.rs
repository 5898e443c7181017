// Chat and classifier wire logic.
//
// Everything here is pure string/JSON handling so it can be exercised by
// host-side tests; the fetch plumbing lives in `chat`.

use std::sync::OnceLock;

use blob_core::{parse_hex_color, ReactionRequest};
use serde::{Deserialize, Serialize};

// Model ids are routed through the AI gateway, which strips the prefix.
pub const CHAT_MODEL: &str = "openai/gpt-4";
pub const CLASSIFIER_MODEL: &str = "openai/gpt-3.5-turbo";

pub const CHAT_TEMPERATURE: f32 = 0.8;
pub const CHAT_MAX_TOKENS: u32 = 150;
pub const CLASSIFIER_TEMPERATURE: f32 = 0.3;
pub const CLASSIFIER_MAX_TOKENS: u32 = 100;

/// Keep the rolling conversation small enough to stay well under the model's
/// context window.
pub const MAX_HISTORY_MESSAGES: usize = 10;

pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a friendly AI assistant with emotions. \
Keep responses concise and conversational (2-3 sentences max). \
Show personality and react emotionally to what the user says.";

pub const CLASSIFIER_SYSTEM_PROMPT: &str = r##"Analyze the emotional context and return ONLY a JSON object with blob visualization parameters.

Available states: idle, thinking, speaking, listening, surprised
Emotions: neutral, excited, irritated, curious, happy, sad, confused

Use "surprised" state for:
- Unexpected questions or revelations
- Shocking statements or plot twists
- Sudden topic changes
- Exclamations or emotional outbursts
- Questions about unusual topics
- Expressions of amazement or disbelief

Format:
{
  "preset": "state",
  "emotion": "emotion",
  "intensity": 0.0-1.0,
  "duration": milliseconds,
  "color": "#hexcolor"
}"##;

pub const CONNECTION_TROUBLE_REPLY: &str =
    "I'm having trouble connecting right now. Let's try again!";
pub const ERROR_REPLY: &str =
    "Sorry, I'm having trouble responding right now. Please try again!";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CompletionRequest {
    pub model: &'static str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize, Debug)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionChoice {
    pub message: ChatMessage,
}

pub fn reply_text(response: &CompletionResponse) -> Option<&str> {
    response
        .choices
        .first()
        .map(|choice| choice.message.content.as_str())
}

/// The classifier's output schema: which preset to show and how strongly.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Classification {
    pub preset: String,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub intensity: Option<f32>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Classification {
    /// Used when the classifier call itself degrades: keep talking.
    pub fn fallback_speaking() -> Self {
        Self {
            preset: "speaking".to_string(),
            emotion: Some("neutral".to_string()),
            intensity: Some(0.5),
            duration: Some(2000),
            color: None,
        }
    }

    /// Used when the whole chat exchange fails: settle back down.
    pub fn fallback_idle() -> Self {
        Self {
            preset: "idle".to_string(),
            emotion: Some("neutral".to_string()),
            intensity: Some(0.5),
            duration: Some(2000),
            color: None,
        }
    }

    pub fn to_request(&self) -> ReactionRequest {
        let mut req = ReactionRequest::preset(&self.preset);
        req.emotion = self.emotion.clone();
        req.intensity = self.intensity.map(|i| i.clamp(0.0, 1.0));
        req.color = self.color.as_deref().and_then(parse_hex_color);
        req
    }
}

/// Pull the first `{...}` block out of the classifier's reply and parse it.
/// Models love to wrap their JSON in prose.
pub fn extract_classification(text: &str) -> Option<Classification> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

pub fn classifier_exchange_message(user: &str, assistant: &str) -> String {
    format!("User said: \"{user}\"\nAI responded: \"{assistant}\"\n\nWhat should the blob look like?")
}

/// Heuristic surprise detector over the raw user text, applied by the chat
/// client alongside the model classifier.
pub fn is_surprising_message(text: &str) -> bool {
    static SURPRISE: OnceLock<regex::Regex> = OnceLock::new();
    let re = SURPRISE.get_or_init(|| {
        regex::Regex::new(
            r"(?i)\b(omg|wow|holy|incredible|amazing|shocking|unbelievable|surprised|can't believe|mind.?blow|wtf|whoa|no way)\b|what\?!|!!",
        )
        .expect("surprise pattern compiles")
    });
    re.is_match(text)
}

pub fn trim_history(history: &mut Vec<ChatMessage>) {
    if history.len() > MAX_HISTORY_MESSAGES {
        let excess = history.len() - MAX_HISTORY_MESSAGES;
        history.drain(0..excess);
    }
}
