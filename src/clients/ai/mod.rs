pub mod openai;
pub mod prompts;

pub use openai::OpenAiCompatibleClient;

use crate::config::CompletionConfig;
use crate::Result;
use async_trait::async_trait;

/// One system instruction plus one user message, answered by a single text
/// completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
        }
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the raw text content of the first choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
    fn provider_name(&self) -> &'static str;
}

pub fn create_completion_client(config: &CompletionConfig) -> Result<Box<dyn CompletionClient>> {
    Ok(Box::new(OpenAiCompatibleClient::new(config)?))
}
