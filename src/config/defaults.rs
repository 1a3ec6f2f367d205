use super::constants::*;

pub(crate) fn hello_message() -> Option<String> {
    Some(HELLO_MESSAGE.to_string())
}

pub(crate) fn log_level() -> Option<String> {
    Some("info".to_string())
}

pub(crate) fn log_dir() -> String {
    LOG_DIR.to_string()
}

pub(crate) fn log_retention_hours() -> u64 {
    LOG_RETENTION_HOURS
}

pub(crate) fn credential_path() -> String {
    CREDENTIAL_FILE_PATH.to_string()
}

pub(crate) fn gemini_endpoint() -> String {
    GEMINI_ENDPOINT.to_string()
}

pub(crate) fn history_dir() -> String {
    HISTORY_DIR.to_string()
}
