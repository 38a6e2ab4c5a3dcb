pub mod llm;
pub mod rules;

pub use llm::{HttpLlmClient, LlmClassifier, LlmClient, LlmError, LlmRequest, MockLlmClient};
pub use rules::RuleClassifier;

use async_trait::async_trait;

use rota_core::intent::ExtractedIntent;

/// One interface over both classifier implementations so the orchestrator
/// never knows which one is wired in. Classification must not fail the
/// pipeline: implementations degrade to [`ExtractedIntent::unknown`] instead
/// of returning errors.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str) -> ExtractedIntent;
}
