//! Application-status classification of scanned email bodies.

use async_trait::async_trait;

use crate::llm_client::{LlmClient, LlmError};
use crate::models::application::ApplicationStatus;

pub mod prompts;

/// Classifier seam consumed by the sync workflow. Production is LLM-backed;
/// a classification failure is never fatal — the caller falls back to
/// [`ApplicationStatus::Other`].
#[async_trait]
pub trait StatusClassifier: Send + Sync {
    async fn classify(&self, body_text: &str) -> Result<ApplicationStatus, LlmError>;
}

pub struct LlmStatusClassifier {
    llm: LlmClient,
}

impl LlmStatusClassifier {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StatusClassifier for LlmStatusClassifier {
    async fn classify(&self, body_text: &str) -> Result<ApplicationStatus, LlmError> {
        let prompt = prompts::CLASSIFY_STATUS_PROMPT.replace("{email_content}", body_text);
        let reply = self.llm.call(&prompt).await?;
        Ok(ApplicationStatus::parse_label(&reply))
    }
}
