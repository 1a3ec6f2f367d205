#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::{
        Configuration,
        constants::{AUTO_TITLE_MAX_CHARS, DEFAULT_TITLE, HELLO_MESSAGE, IMPORTED_TITLE},
    },
    models::Message,
};

#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    title: String,
    messages: Vec<Message>,
    system_prompt: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        Self::default()
            .with_id(uuid::Uuid::new_v4().to_string())
            .with_title(title)
    }

    /// A fresh conversation with the placeholder title, seeded with the
    /// configured hello notice.
    pub fn new_hello() -> Self {
        let mut conversation = Self::new(DEFAULT_TITLE);
        conversation.messages.push(Message::new_notice(
            Configuration::instance()
                .general
                .hello_message
                .as_deref()
                .unwrap_or(HELLO_MESSAGE),
        ));
        conversation
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
        self.touch();
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(chrono::Utc::now());
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user()).count()
    }

    /// Replaces the placeholder title with the beginning of the first user
    /// message. Only applies right after the first exchange, a title the
    /// user picked is never overwritten. Returns true if the title changed.
    pub fn derive_title(&mut self) -> bool {
        if !self.has_default_title() || self.user_turns() != 1 {
            return false;
        }

        let first = match self.messages.iter().find(|m| m.is_user()) {
            Some(msg) => msg.text().trim(),
            None => return false,
        };

        let title = first.chars().take(AUTO_TITLE_MAX_CHARS).collect::<String>();
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        self.set_title(title);
        true
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            id: "".to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: vec![],
            system_prompt: String::new(),
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }
}

/// On-disk shape of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationFile {
    pub title: String,
    pub messages: Vec<(String, String)>,
    pub prompt: String,
}

impl From<&Conversation> for ConversationFile {
    fn from(value: &Conversation) -> Self {
        ConversationFile {
            title: value.title.clone(),
            messages: value.messages.iter().map(<(String, String)>::from).collect(),
            prompt: value.system_prompt.clone(),
        }
    }
}

impl From<ConversationFile> for Conversation {
    fn from(value: ConversationFile) -> Self {
        Conversation::new(value.title)
            .with_messages(value.messages.into_iter().map(Message::from).collect())
            .with_system_prompt(value.prompt)
    }
}

impl ConversationFile {
    /// Builds a file record out of a loosely shaped JSON object. Missing or
    /// mistyped fields fall back to their defaults instead of failing.
    /// Returns None when the value is not an object at all.
    pub fn from_value(value: &Value) -> Option<ConversationFile> {
        let object = value.as_object()?;

        let title = object
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(IMPORTED_TITLE)
            .to_string();

        let messages = match object.get("messages").and_then(Value::as_array) {
            Some(turns) => turns.iter().filter_map(normalize_turn).collect(),
            None => vec![],
        };

        let prompt = ["prompt", "systemPrompt", "system_prompt"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        Some(ConversationFile {
            title,
            messages,
            prompt,
        })
    }
}

/// Accepts `[speaker, text]` pairs as well as objects carrying the speaker
/// and the text under one of the usual keys.
fn normalize_turn(turn: &Value) -> Option<(String, String)> {
    match turn {
        Value::Array(pair) if pair.len() == 2 => {
            let speaker = pair[0].as_str()?;
            let text = pair[1].as_str()?;
            Some((speaker.to_string(), text.to_string()))
        }
        Value::Object(object) => {
            let speaker = ["speaker", "sender", "role"]
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str))?;
            let text = ["text", "message", "content"]
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str))?;
            Some((speaker.to_string(), text.to_string()))
        }
        _ => {
            log::warn!("Skipping malformed turn: {}", turn);
            None
        }
    }
}
