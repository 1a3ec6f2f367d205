use std::fmt::Display;

/// Who produced a turn. Labels which are not recognized are kept verbatim
/// so that imported conversations survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    Notice,
    Other(String),
}

impl Speaker {
    pub fn label(&self) -> &str {
        match self {
            Speaker::User => "You",
            Speaker::Assistant => "Gemini",
            Speaker::Notice => "System",
            Speaker::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "you" | "user" => Speaker::User,
            "gemini" | "assistant" | "model" => Speaker::Assistant,
            "system" | "notice" | "system-notice" => Speaker::Notice,
            _ => Speaker::Other(label.to_string()),
        }
    }

    /// Role used by the remote API, None when the turn is not submitted
    pub fn remote_role(&self) -> Option<&'static str> {
        match self {
            Speaker::User => Some("user"),
            Speaker::Assistant => Some("model"),
            _ => None,
        }
    }
}

impl Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    speaker: Speaker,
    text: String,
}

impl Message {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    pub fn new_user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn new_assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    pub fn new_notice(text: impl Into<String>) -> Self {
        Self::new(Speaker::Notice, text)
    }

    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

impl From<(String, String)> for Message {
    fn from((label, text): (String, String)) -> Self {
        Message::new(Speaker::from_label(&label), text)
    }
}

impl From<&Message> for (String, String) {
    fn from(value: &Message) -> Self {
        (value.speaker.label().to_string(), value.text.clone())
    }
}
