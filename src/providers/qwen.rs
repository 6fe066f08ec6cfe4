use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ProviderSettings;
use crate::extract::extract_svg;
use crate::model::GenerationModel;
use crate::types::GeneratedAsset;
use crate::{Result, VecforgeError};

const DEFAULT_MODEL: &str = "qwen-plus";

const SYSTEM_INSTRUCTION: &str = "You are a world-class expert in Scalable Vector Graphics (SVG) design. \
Return ONLY raw SVG code for the user's request. \
Rules: the SVG must be self-contained, include a viewBox attribute, use gradients for visual depth, \
and contain no markdown backticks and no prose.";

/// Synchronous markup provider: one chat-completion call, SVG extracted
/// from the returned text.
#[derive(Clone)]
pub struct QwenSvg {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl QwenSvg {
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("reqwest client build should not fail");

        Self {
            http,
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(settings.api_key.clone()).with_base_url(settings.base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn generation_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/services/aigc/text-generation/generation")
    }
}

#[derive(Debug, Deserialize)]
struct TextGenerationResponse {
    #[serde(default)]
    output: Option<TextGenerationOutput>,
}

#[derive(Debug, Deserialize)]
struct TextGenerationOutput {
    #[serde(default)]
    choices: Vec<TextGenerationChoice>,
}

#[derive(Debug, Deserialize)]
struct TextGenerationChoice {
    #[serde(default)]
    message: Option<TextGenerationMessage>,
}

#[derive(Debug, Deserialize)]
struct TextGenerationMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerationModel for QwenSvg {
    fn provider(&self) -> &str {
        "dashscope"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedAsset> {
        let body = json!({
            "model": self.model,
            "input": {
                "messages": [
                    { "role": "system", "content": SYSTEM_INSTRUCTION },
                    { "role": "user", "content": format!("Generate SVG for: {prompt}") }
                ]
            },
            "parameters": {
                "result_format": "message",
                "temperature": 0.7,
                "top_p": 0.95
            }
        });

        let response = self
            .http
            .post(self.generation_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VecforgeError::Api { status, body: text });
        }

        let parsed = response
            .json::<TextGenerationResponse>()
            .await
            .map_err(|err| {
                VecforgeError::UpstreamProtocol(format!("malformed generation response: {err}"))
            })?;

        let content = parsed
            .output
            .and_then(|output| output.choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                VecforgeError::UpstreamProtocol(
                    "generation response is missing output.choices[0].message.content".to_string(),
                )
            })?;

        let markup = extract_svg(&content);
        if markup.is_empty() {
            return Err(VecforgeError::NoMarkupFound);
        }

        Ok(GeneratedAsset::svg(markup))
    }
}
