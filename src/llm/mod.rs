pub mod models;
pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM connection error: {0}")]
    Connection(String),

    #[error("Inference API responded with status code: {status}")]
    Status { status: u16, body: String },

    #[error("{cause}")]
    Malformed { cause: String, raw: String },

    #[error("Inference request timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Response body that accompanied the failure, empty if none arrived.
    pub fn raw_response(&self) -> &str {
        match self {
            LlmError::Status { body, .. } => body,
            LlmError::Malformed { raw, .. } => raw,
            _ => "",
        }
    }
}

#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate_sql(&self, question: &str, schema: &str) -> Result<String, LlmError>;
}

/// Turns a question into SQL. Never fails: a failed generation comes back as
/// a diagnostic string in place of the SQL, which then shows up in the chat.
pub struct Translator {
    generator: Box<dyn SqlGenerator>,
    timeout: Duration,
}

impl Translator {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let generator: Box<dyn SqlGenerator> = match config.backend.as_str() {
            "huggingface" => Box::new(providers::huggingface::HuggingFaceProvider::new(config)?),
            "stub" => Box::new(providers::stub::StubProvider::new(config.stub_sql.clone())),
            _ => {
                return Err(LlmError::Config(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        Ok(Self::with_generator(generator, config.timeout()))
    }

    pub fn with_generator(generator: Box<dyn SqlGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn translate(&self, schema_text: &str, question: &str) -> String {
        let generation = self.generator.generate_sql(question, schema_text);

        let error = match tokio::time::timeout(self.timeout, generation).await {
            Ok(Ok(sql)) => {
                info!("Generated SQL ({} chars)", sql.len());
                return sql;
            }
            Ok(Err(e)) => e,
            Err(_) => LlmError::Timeout(self.timeout),
        };

        warn!("SQL generation failed: {}", error);
        diagnostic(&error)
    }
}

fn diagnostic(error: &LlmError) -> String {
    format!(
        "Error: Unable to generate SQL query. {}\n\nResponse: {}",
        error,
        error.raw_response()
    )
}
