use thiserror::Error;

#[derive(Debug, Error)]
pub enum VecforgeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported model: {model}")]
    UnsupportedModel { model: String },
    #[error("api error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("upstream protocol error: {0}")]
    UpstreamProtocol(String),
    #[error("job submission failed ({status}): {message}")]
    JobSubmissionFailed {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("job failed: {reason}")]
    JobFailed { reason: String },
    #[error("job did not complete within {attempts} poll attempts")]
    JobTimeout { attempts: u32 },
    #[error("no svg markup found in model output")]
    NoMarkupFound,
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VecforgeError>;
