use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::model::GenerationModel;
use crate::providers::{QwenSvg, WanxImages};
use crate::types::GeneratedAsset;
use crate::{Result, VecforgeError};

/// Dispatches generation requests to a closed registry of provider models.
///
/// Input validation happens here, before any model is touched, so a bad
/// prompt or an unknown model id never reaches the network. The registry is
/// populated once at startup and never mutated afterwards; concurrent
/// requests share nothing beyond the immutable models.
pub struct Orchestrator {
    models: HashMap<String, Arc<dyn GenerationModel>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Standard registry for the two DashScope-backed models.
    pub fn from_config(config: &Config) -> Self {
        let mut orchestrator = Self::new();
        let qwen = QwenSvg::from_settings(&config.qwen);
        let wanx = WanxImages::from_settings(&config.wanx);
        let qwen_id = qwen.model_id().to_string();
        let wanx_id = wanx.model_id().to_string();
        orchestrator.register_model(qwen_id, qwen);
        orchestrator.register_model(wanx_id, wanx);
        orchestrator
    }

    pub fn register_model(&mut self, id: impl Into<String>, model: impl GenerationModel + 'static) {
        self.models.insert(id.into(), Arc::new(model));
    }

    pub fn model_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.models.keys().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub async fn generate(&self, prompt: &str, model_id: &str) -> Result<GeneratedAsset> {
        if prompt.trim().is_empty() {
            return Err(VecforgeError::InvalidInput(
                "prompt must not be empty".to_string(),
            ));
        }

        let model = self
            .models
            .get(model_id)
            .ok_or_else(|| VecforgeError::UnsupportedModel {
                model: model_id.to_string(),
            })?;

        model.generate(prompt).await
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GenerationModel for CountingModel {
        fn provider(&self) -> &str {
            "stub"
        }

        fn model_id(&self) -> &str {
            "stub-svg"
        }

        async fn generate(&self, _prompt: &str) -> Result<GeneratedAsset> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GeneratedAsset::svg("<svg viewBox=\"0 0 1 1\"></svg>"))
        }
    }

    fn counting_orchestrator() -> (Orchestrator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut orchestrator = Orchestrator::new();
        orchestrator.register_model(
            "stub-svg",
            CountingModel {
                calls: Arc::clone(&calls),
            },
        );
        (orchestrator, calls)
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_dispatch() {
        let (orchestrator, calls) = counting_orchestrator();
        let err = orchestrator
            .generate("   ", "stub-svg")
            .await
            .expect_err("blank prompt");
        assert!(matches!(err, VecforgeError::InvalidInput(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_model_is_rejected_before_dispatch() {
        let (orchestrator, calls) = counting_orchestrator();
        let err = orchestrator
            .generate("a fox", "no-such-model")
            .await
            .expect_err("unknown model");
        match err {
            VecforgeError::UnsupportedModel { model } => assert_eq!(model, "no-such-model"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn registered_model_receives_the_call() -> Result<()> {
        let (orchestrator, calls) = counting_orchestrator();
        let asset = orchestrator.generate("a fox", "stub-svg").await?;
        assert_eq!(asset.kind, AssetKind::Svg);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }
}
