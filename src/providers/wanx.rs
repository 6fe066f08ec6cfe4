use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::model::GenerationModel;
use crate::types::GeneratedAsset;
use crate::{Result, VecforgeError};

const DEFAULT_MODEL: &str = "wanx2.1-t2i-turbo";

/// Bounded polling contract for the asynchronous job: the ceiling and the
/// inter-poll delay are what matter, not the loop construct.
#[derive(Clone, Copy, Debug)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_secs(3),
        }
    }
}

/// Asynchronous image provider: submit a generation job, then poll the
/// task endpoint until a terminal status or the attempt ceiling.
#[derive(Clone)]
pub struct WanxImages {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    poll: PollPolicy,
}

impl WanxImages {
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
            poll: PollPolicy::default(),
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

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    fn synthesis_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/services/aigc/text2image/image-synthesis")
    }

    fn task_url(&self, task_id: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/tasks/{task_id}")
    }

    /// Submits the generation job and returns the upstream task id.
    ///
    /// Submission is strict: a body that does not parse is a protocol
    /// error, unlike the tolerant handling inside the poll loop.
    async fn submit(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "input": { "prompt": prompt },
            "parameters": { "style": "<auto>", "size": "1024*1024", "n": 1 }
        });

        let response = self
            .http
            .post(self.synthesis_url())
            .bearer_auth(&self.api_key)
            .header("X-DashScope-Async", "enable")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<TaskSubmission>(&text).map_err(|err| {
            VecforgeError::UpstreamProtocol(format!("malformed submission response: {err}"))
        })?;

        if !status.is_success() {
            return Err(VecforgeError::JobSubmissionFailed {
                status,
                message: parsed.diagnostic().unwrap_or(text),
            });
        }

        match parsed.output.and_then(|output| output.task_id) {
            Some(task_id) if !task_id.trim().is_empty() => Ok(task_id),
            _ => Err(VecforgeError::JobSubmissionFailed {
                status,
                message: "submission response is missing output.task_id".to_string(),
            }),
        }
    }

    /// Polls the task until it succeeds with a result URL, fails, or the
    /// attempt ceiling is reached. An unparseable status body is a
    /// transient miss and the loop continues; that tolerance covers the
    /// status query only, never submission, and transport errors still
    /// terminate the request.
    async fn await_result(&self, task_id: &str) -> Result<String> {
        let url = self.task_url(task_id);

        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval).await;

            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await?;

            let parsed = match response.json::<TaskStatus>().await {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(task_id, attempt, error = %err, "unparseable task status, retrying");
                    continue;
                }
            };

            let Some(output) = parsed.output else {
                debug!(task_id, attempt, "task status without output, retrying");
                continue;
            };

            match output.task_status.as_deref() {
                Some("SUCCEEDED") => {
                    let result_url = output
                        .results
                        .into_iter()
                        .find_map(|result| result.url)
                        .filter(|url| !url.trim().is_empty());
                    match result_url {
                        Some(result_url) => return Ok(result_url),
                        // Succeeded with no URL counts toward the ceiling.
                        None => {
                            debug!(task_id, attempt, "task succeeded without a result url");
                            continue;
                        }
                    }
                }
                Some("FAILED") => {
                    return Err(VecforgeError::JobFailed {
                        reason: output
                            .message
                            .filter(|message| !message.trim().is_empty())
                            .unwrap_or_else(|| "upstream reported failure".to_string()),
                    });
                }
                status => {
                    debug!(task_id, attempt, status = status.unwrap_or("unknown"), "task pending");
                }
            }
        }

        Err(VecforgeError::JobTimeout {
            attempts: self.poll.max_attempts,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TaskSubmission {
    #[serde(default)]
    output: Option<TaskSubmissionOutput>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl TaskSubmission {
    fn diagnostic(&self) -> Option<String> {
        match (self.code.as_deref(), self.message.as_deref()) {
            (Some(code), Some(message)) => Some(format!("{code}: {message}")),
            (None, Some(message)) => Some(message.to_string()),
            (Some(code), None) => Some(code.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaskSubmissionOutput {
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskStatus {
    #[serde(default)]
    output: Option<TaskStatusOutput>,
}

#[derive(Debug, Deserialize)]
struct TaskStatusOutput {
    #[serde(default)]
    task_status: Option<String>,
    #[serde(default)]
    results: Vec<TaskResult>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskResult {
    #[serde(default)]
    url: Option<String>,
}

#[async_trait]
impl GenerationModel for WanxImages {
    fn provider(&self) -> &str {
        "dashscope"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedAsset> {
        let task_id = self.submit(prompt).await?;
        debug!(%task_id, "image job submitted");
        let url = self.await_result(&task_id).await?;
        Ok(GeneratedAsset::image_url(url))
    }
}
