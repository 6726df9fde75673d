use crate::config::LlmConfig;
use crate::llm::models::{GeneratedText, InferenceOptions, InferenceParameters, InferenceRequest};
use crate::llm::{LlmError, SqlGenerator};
use async_trait::async_trait;
use tracing::{debug, error};

/// Hosted seq2seq model behind the Hugging Face inference API.
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    max_new_tokens: u32,
    wait_for_model: bool,
}

impl HuggingFaceProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            LlmError::Config("API key is required for the huggingface backend".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            max_new_tokens: config.max_new_tokens,
            wait_for_model: config.wait_for_model,
        })
    }

    // The model was fine-tuned on "<schema> <question>" inputs.
    fn prepare_prompt(&self, question: &str, schema: &str) -> String {
        format!("{} {}", schema, question)
    }
}

/// First `generated_text` of the endpoint's JSON array.
fn parse_generated_text(body: &str) -> Result<String, LlmError> {
    let results: Vec<GeneratedText> =
        serde_json::from_str(body).map_err(|e| LlmError::Malformed {
            cause: format!("Failed to parse inference response: {}", e),
            raw: body.to_string(),
        })?;

    results
        .into_iter()
        .next()
        .map(|r| r.generated_text)
        .ok_or_else(|| LlmError::Malformed {
            cause: "Inference response contained no results".to_string(),
            raw: body.to_string(),
        })
}

#[async_trait]
impl SqlGenerator for HuggingFaceProvider {
    async fn generate_sql(&self, question: &str, schema: &str) -> Result<String, LlmError> {
        let request = InferenceRequest {
            inputs: self.prepare_prompt(question, schema),
            parameters: InferenceParameters {
                max_new_tokens: self.max_new_tokens,
            },
            options: InferenceOptions {
                wait_for_model: self.wait_for_model,
            },
        };

        debug!("Sending inference request to {}", self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Connection(format!("Failed to read response body: {}", e)))?;

        debug!("Raw inference response: {}", body);

        if !status.is_success() {
            error!("Inference API responded with status code: {}", status);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_generated_text(&body)
    }
}
