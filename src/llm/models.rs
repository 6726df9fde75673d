use serde::{Deserialize, Serialize};

// Request body for the hosted text2text-generation endpoint
#[derive(Debug, Serialize)]
pub struct InferenceRequest {
    pub inputs: String,
    pub parameters: InferenceParameters,
    pub options: InferenceOptions,
}

#[derive(Debug, Serialize)]
pub struct InferenceParameters {
    pub max_new_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct InferenceOptions {
    pub wait_for_model: bool,
}

// One element of the JSON array the endpoint answers with
#[derive(Debug, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}
