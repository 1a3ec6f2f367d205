#[cfg(test)]
#[path = "credential_test.rs"]
mod tests;

use crate::models::ConfigError;

/// Reads the API key from a plain-text file. Surrounding whitespace is
/// ignored; a file without any other content is rejected.
pub fn load_api_key(path: &str) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::MissingCredential {
        path: path.to_string(),
        source,
    })?;

    let key = raw.trim();
    if key.is_empty() {
        return Err(ConfigError::EmptyCredential {
            path: path.to_string(),
        });
    }
    log::debug!("Loaded credential from {}", path);
    Ok(key.to_string())
}
