use std::path::PathBuf;

use thiserror::Error;

/// Missing or unusable configuration. Only fatal during startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("credential file {path} not found, create it and put your Gemini API key inside")]
    MissingCredential {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file {path} is empty, put your Gemini API key inside")]
    EmptyCredential { path: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The remote call failed. Recovered by showing the message in the transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GenerationError {
    pub message: String,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(value: reqwest::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// Import or export failed. The in-memory collection is never touched.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} does not contain a conversation object")]
    NotAnObject { path: PathBuf },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("conversation {0} not found")]
pub struct NotFoundError(pub String);
