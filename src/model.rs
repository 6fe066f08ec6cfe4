use async_trait::async_trait;

use crate::Result;
use crate::types::GeneratedAsset;

/// One upstream generation capability: a prompt in, a single asset out.
///
/// Implementations own their HTTP client and credentials and keep no state
/// across calls, so a model may serve concurrent requests freely.
#[async_trait]
pub trait GenerationModel: Send + Sync {
    fn provider(&self) -> &str;
    fn model_id(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<GeneratedAsset>;
}
