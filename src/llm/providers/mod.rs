pub mod huggingface;
pub mod stub;
