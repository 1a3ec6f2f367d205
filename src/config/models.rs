use eyre::Result;
use serde::{Deserialize, Serialize};

#[allow(unused_imports)]
use super::CONFIG;

use super::constants::{
    CREDENTIAL_FILE_PATH, GEMINI_ENDPOINT, HELLO_MESSAGE, HISTORY_DIR, LOG_DIR,
    LOG_RETENTION_HOURS, MODELS,
};
use super::defaults::*;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Configuration {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub credential: CredentialConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default = "hello_message")]
    pub hello_message: Option<String>,

    #[serde(default)]
    pub verbose: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogConfig {
    #[serde(default = "log_level")]
    pub level: Option<String>,

    #[serde(default)]
    pub filters: Option<Vec<LogFilter>>,

    /// Directory holding one timestamped log file per run
    #[serde(default = "log_dir")]
    pub dir: String,

    /// Log files older than this are removed at startup
    #[serde(default = "log_retention_hours")]
    pub retention_hours: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogFilter {
    #[serde(default)]
    pub module: Option<String>,

    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CredentialConfig {
    #[serde(default = "credential_path")]
    pub path: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiConfig {
    #[serde(default = "gemini_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub default_model: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u16>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StorageConfig {
    /// Exported conversations are written here
    #[serde(default = "history_dir")]
    pub history_dir: String,
}

impl Configuration {
    #[cfg(not(test))]
    pub fn instance() -> &'static Configuration {
        CONFIG.get_or_init(Configuration::default)
    }

    #[cfg(not(test))]
    pub fn init(config: Configuration) -> Result<()> {
        CONFIG
            .set(config)
            .map_err(|_| eyre::eyre!("Config already initialized"))?;
        Ok(())
    }

    #[cfg(test)]
    pub fn instance() -> &'static Configuration {
        use super::TEST_CONFIG;
        TEST_CONFIG.with(|config| *config.borrow())
    }

    #[cfg(test)]
    pub fn init(config: Configuration) -> Result<()> {
        use super::TEST_CONFIG;
        TEST_CONFIG.with(|test_config| {
            *test_config.borrow_mut() = Box::leak(Box::new(config));
        });
        Ok(())
    }
}

impl GeminiConfig {
    /// Returns the configured default model when it is part of the
    /// allow-list, the first allowed model otherwise.
    pub fn default_model(&self) -> &str {
        match self.default_model.as_deref() {
            Some(model) if MODELS.contains(&model) => model,
            Some(model) => {
                log::warn!("Model {} is not supported, using {}", model, MODELS[0]);
                MODELS[0]
            }
            None => MODELS[0],
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            hello_message: Some(HELLO_MESSAGE.to_string()),
            verbose: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Some("info".to_string()),
            filters: None,
            dir: LOG_DIR.to_string(),
            retention_hours: LOG_RETENTION_HOURS,
        }
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            path: CREDENTIAL_FILE_PATH.to_string(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: GEMINI_ENDPOINT.to_string(),
            default_model: None,
            timeout_secs: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_dir: HISTORY_DIR.to_string(),
        }
    }
}
