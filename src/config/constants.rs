use std::time::Duration;

/// Placeholder title for conversations which have not been named yet
pub const DEFAULT_TITLE: &str = "New Chat";

/// Title used when an imported file does not carry a usable one
pub const IMPORTED_TITLE: &str = "Imported Chat";

/// Max number of characters taken from the first user message as title
pub const AUTO_TITLE_MAX_CHARS: usize = 30;

pub const HELLO_MESSAGE: &str = "Hello! I'm Gemini. How can I help you?";

pub const ERROR_PREFIX: &str = "An error occurred: ";

/// Models a conversation can be generated with. The first one is the default.
pub const MODELS: &[&str] = &["gemini-2.0-flash", "gemini-2.5-flash", "gemini-2.5-pro"];

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.9;

/// Inclusive bounds for both temperature and top-p
pub const SAMPLING_MIN: f32 = 0.0;
pub const SAMPLING_MAX: f32 = 1.0;
pub const SAMPLING_STEP: f32 = 0.05;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const CREDENTIAL_FILE_PATH: &str = "api.txt";

pub const HISTORY_DIR: &str = "history";

pub const LOG_DIR: &str = "logs";

pub const LOG_FILE_PREFIX: &str = "gemchat-";
pub const LOG_FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

pub const LOG_RETENTION_HOURS: u64 = 48;

pub const FRAME_DURATION: Duration = Duration::from_millis(1000 / 30);
