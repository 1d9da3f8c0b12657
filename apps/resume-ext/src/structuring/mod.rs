//! Record structuring: the boundary to the language model.
//!
//! `RecordStructurer` is text in, text out. What the reply contains is the
//! unwrapper's problem (`unwrap::parse_response`), not the structurer's.

use std::path::Path;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INVENTION_INSTRUCTION};
use crate::llm_client::LlmClient;

pub mod prompts;
pub mod unwrap;

use prompts::{build_extract_prompt, RESUME_EXTRACT_SYSTEM};

/// Turns cleaned resume text into the model's raw reply.
///
/// Carried in `AppState` as `Arc<dyn RecordStructurer>` so tests can swap in
/// a deterministic stub.
#[async_trait]
pub trait RecordStructurer: Send + Sync {
    async fn structure(&self, text: &str, source_path: &Path) -> Result<String, AppError>;

    /// Backend label for logs.
    fn name(&self) -> &str;
}

/// Structurer backed by the Anthropic Messages API.
pub struct LlmStructurer {
    llm: LlmClient,
    system: String,
}

impl LlmStructurer {
    pub fn new(llm: LlmClient) -> Self {
        let system = format!("{RESUME_EXTRACT_SYSTEM} {JSON_ONLY_SYSTEM} {NO_INVENTION_INSTRUCTION}");
        Self { llm, system }
    }
}

#[async_trait]
impl RecordStructurer for LlmStructurer {
    async fn structure(&self, text: &str, source_path: &Path) -> Result<String, AppError> {
        let prompt = build_extract_prompt(text, &source_path.display().to_string());
        Ok(self.llm.call_text(&prompt, &self.system).await?)
    }

    fn name(&self) -> &str {
        self.llm.model()
    }
}
