pub mod gemini;

pub use gemini::{Gemini, Session};

#[cfg(test)]
use mockall::{automock, predicate::*};

use crate::{
    config::GeminiConfig,
    models::{GenerationError, Message},
};
use async_trait::async_trait;
use eyre::Result;
use std::{sync::Arc, time::Duration};

/// A remote text generation service. Implementations own the model
/// selection and the system instruction, never the conversation itself.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait Backend {
    fn name(&self) -> &str;

    /// Switches model and/or system instruction. Blank instructions mean
    /// "no instruction". Returns true when the session had to be rebuilt.
    async fn configure(&self, model: &str, system_instruction: Option<String>) -> bool;

    /// Generates the reply to `prompt`, given the previous turns.
    async fn generate(
        &self,
        history: &[Message],
        prompt: &str,
        temperature: f32,
        top_p: f32,
    ) -> Result<String, GenerationError>;

    async fn list_models(&self) -> Result<Vec<String>>;

    async fn set_api_key(&self, api_key: &str);
}

pub type ArcBackend = Arc<dyn Backend + Send + Sync>;

pub fn new_backend(config: &GeminiConfig, api_key: &str) -> ArcBackend {
    let mut gemini = Gemini::new(config.default_model())
        .with_endpoint(&config.endpoint)
        .with_api_key(api_key);
    if let Some(timeout) = config.timeout_secs {
        gemini = gemini.with_timeout(Duration::from_secs(timeout as u64));
    }
    log::debug!("Initialized backend {}", gemini.name());
    Arc::new(gemini)
}
