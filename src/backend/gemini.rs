#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::{fmt::Display, time};

use crate::{
    backend::Backend,
    config::{constants::GEMINI_ENDPOINT, user_agent},
    models::{GenerationError, Message},
};
use async_trait::async_trait;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Model and system instruction the next requests are sent with.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub model: String,
    pub system_instruction: Option<String>,
}

pub struct Gemini {
    alias: String,
    endpoint: String,
    timeout: Option<time::Duration>,
    client: reqwest::Client,

    api_key: RwLock<Option<String>>,
    session: RwLock<Session>,
}

impl Gemini {
    pub fn new(model: &str) -> Self {
        Gemini {
            session: RwLock::new(Session {
                model: model.to_string(),
                system_instruction: None,
            }),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = RwLock::new(Some(api_key.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    async fn url(&self, path: &str) -> Result<reqwest::Url> {
        let key = self.api_key.read().await.clone();
        let mut params = vec![];
        if let Some(key) = &key {
            params.push(("key", key.as_str()));
        }
        reqwest::Url::parse_with_params(
            &format!("{}/{}", self.endpoint, path),
            params.as_slice(),
        )
        .wrap_err("parsing url")
    }

    fn with_defaults(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder = builder.header("User-Agent", user_agent());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

#[async_trait]
impl Backend for Gemini {
    fn name(&self) -> &str {
        &self.alias
    }

    async fn configure(&self, model: &str, system_instruction: Option<String>) -> bool {
        let wanted = Session {
            model: model.to_string(),
            system_instruction: system_instruction
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };

        let mut session = self.session.write().await;
        if *session == wanted {
            return false;
        }
        log::debug!(
            "Rebuilding session: model={} system_instruction={}",
            wanted.model,
            wanted.system_instruction.is_some()
        );
        *session = wanted;
        true
    }

    async fn generate(
        &self,
        history: &[Message],
        prompt: &str,
        temperature: f32,
        top_p: f32,
    ) -> Result<String, GenerationError> {
        let session = self.session().await;
        if session.model.is_empty() {
            return Err(GenerationError::new("no model is set"));
        }

        let req = GenerateContentRequest {
            contents: build_contents(history, prompt),
            system_instruction: session.system_instruction.map(|text| Content {
                role: None,
                parts: vec![ContentPart::text(text)],
            }),
            generation_config: GenerationConfig {
                temperature,
                top_p,
            },
        };

        let url = self
            .url(&format!("models/{}:generateContent", session.model))
            .await
            .map_err(|e| GenerationError::new(e.to_string()))?;

        log::trace!("Sending generate request: {:?}", req);

        let resp = self
            .with_defaults(self.client.post(url))
            .json(&req)
            .send()
            .await?;

        if !resp.status().is_success() {
            let http_code = resp.status().as_u16();
            let body = resp.text().await?;
            let err = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => GeminiError {
                    http_code,
                    ..err.error
                },
                Err(_) => GeminiError {
                    http_code,
                    message: body.trim().to_string(),
                    ..Default::default()
                },
            };
            log::warn!("Generate request failed: {}", err);
            return Err(err.into());
        }

        let content: GenerateContentResponse = resp.json().await?;
        if let Some(usage) = &content.usage_metadata {
            log::debug!(
                "Generated reply with {}, tokens: prompt={} candidates={} total={}",
                content.model_version.as_deref().unwrap_or(&session.model),
                usage.prompt_token_count,
                usage.candidates_token_count,
                usage.total_token_count
            );
        }
        content.text()
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let mut models = vec![];
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.url("models").await?;
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let res = self
                .with_defaults(self.client.get(url))
                .send()
                .await
                .wrap_err("listing models")?
                .error_for_status()
                .wrap_err("listing models")?
                .json::<ModelListResponse>()
                .await
                .wrap_err("parsing model list")?;

            models.extend(
                res.models
                    .into_iter()
                    .filter(|m| {
                        m.supported_generation_methods
                            .iter()
                            .any(|method| method == "generateContent")
                    })
                    .map(|m| m.name.strip_prefix("models/").unwrap_or(&m.name).to_string()),
            );

            match res.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        models.sort();
        Ok(models)
    }

    async fn set_api_key(&self, api_key: &str) {
        let mut key = self.api_key.write().await;
        *key = Some(api_key.to_string());
        log::info!("API key of {} has been replaced", self.alias);
    }
}

impl Default for Gemini {
    fn default() -> Self {
        Gemini {
            alias: "Gemini".to_string(),
            endpoint: GEMINI_ENDPOINT.to_string(),
            timeout: None,
            client: reqwest::Client::new(),
            api_key: RwLock::new(None),
            session: RwLock::new(Session::default()),
        }
    }
}

/// Maps the previous turns and the new prompt to Gemini contents. Only
/// user and assistant turns are sent; notices stay local.
fn build_contents(history: &[Message], prompt: &str) -> Vec<Content> {
    let mut contents = history
        .iter()
        .filter_map(|msg| {
            msg.speaker().remote_role().map(|role| Content {
                role: Some(role.to_string()),
                parts: vec![ContentPart::text(msg.text())],
            })
        })
        .collect::<Vec<_>>();

    contents.push(Content {
        role: Some("user".to_string()),
        parts: vec![ContentPart::text(prompt)],
    });
    contents
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelResponse {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelListResponse {
    #[serde(default)]
    models: Vec<ModelResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_page_token: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentPartsBlob {
    mime_type: String,
    data: String,
}

/// One part of a content. Replies may carry extra fields such as
/// `thoughtSignature`, which are ignored.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<ContentPartsBlob>,
}

impl ContentPart {
    fn text(text: impl Into<String>) -> Self {
        ContentPart {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GenerateCandidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<GenerateUsageMetadata>,
    model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate
    fn text(&self) -> Result<String, GenerationError> {
        let Some(candidate) = self.candidates.first() else {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            return Err(GenerationError::new(format!("prompt blocked: {}", reason)));
        };

        let text = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| {
                if let Some(blob) = &part.inline_data {
                    log::warn!("Ignoring inline data of type {}", blob.mime_type);
                }
                part.text.as_deref()
            })
            .collect::<String>();

        if text.is_empty() {
            if let Some(reason) = &candidate.finish_reason {
                return Err(GenerationError::new(format!(
                    "empty reply, finish reason: {}",
                    reason
                )));
            }
        }
        Ok(text)
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateCandidate {
    #[serde(default)]
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateUsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: GeminiError,
}

#[derive(Default, Error, Debug, Serialize, Deserialize)]
pub struct GeminiError {
    #[serde(skip)]
    pub http_code: u16,
    #[serde(default)]
    pub message: String,
    pub code: Option<u16>,
    pub status: Option<String>,
}

impl Display for GeminiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            Some(status) => write!(
                f,
                "Gemini error ({} {}): {}",
                self.http_code, status, self.message
            ),
            None => write!(f, "Gemini error ({}): {}", self.http_code, self.message),
        }
    }
}

impl From<GeminiError> for GenerationError {
    fn from(value: GeminiError) -> Self {
        GenerationError::new(value.to_string())
    }
}
