use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, warn};

use crate::VecforgeError;
use crate::orchestrator::Orchestrator;
use crate::types::{ErrorReply, GenerateBody, GenerateReply};

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, request_timeout: Duration) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            request_timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Response {
    // Every non-2xx reply carries the `{ "error": ... }` shape, including
    // bodies axum itself refuses to deserialize.
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "rejected malformed request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorReply {
                    error: format!("invalid request body: {}", rejection.body_text()),
                }),
            )
                .into_response();
        }
    };

    let budget = state.request_timeout;
    let result = match tokio::time::timeout(
        budget,
        state.orchestrator.generate(&body.prompt, &body.model_id),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(VecforgeError::Timeout {
            secs: budget.as_secs(),
        }),
    };

    match result {
        Ok(asset) => {
            info!(model = %body.model_id, kind = ?asset.kind, "generation succeeded");
            (StatusCode::OK, Json(GenerateReply::from(asset))).into_response()
        }
        Err(err) => {
            let status = error_status(&err);
            warn!(model = %body.model_id, %status, error = %err, "generation failed");
            (
                status,
                Json(ErrorReply {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Maps the error taxonomy onto the outbound contract. Upstream HTTP
/// failures forward the upstream status when it is itself an error code.
fn error_status(err: &VecforgeError) -> StatusCode {
    match err {
        VecforgeError::InvalidInput(_) | VecforgeError::UnsupportedModel { .. } => {
            StatusCode::BAD_REQUEST
        }
        VecforgeError::Timeout { .. } | VecforgeError::JobTimeout { .. } => {
            StatusCode::GATEWAY_TIMEOUT
        }
        VecforgeError::Api { status, .. } | VecforgeError::JobSubmissionFailed { status, .. } => {
            if status.is_client_error() || status.is_server_error() {
                *status
            } else {
                StatusCode::BAD_GATEWAY
            }
        }
        VecforgeError::UpstreamProtocol(_)
        | VecforgeError::JobFailed { .. }
        | VecforgeError::NoMarkupFound
        | VecforgeError::Http(_) => StatusCode::BAD_GATEWAY,
        VecforgeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_the_taxonomy() {
        assert_eq!(
            error_status(&VecforgeError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&VecforgeError::UnsupportedModel { model: "x".into() }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&VecforgeError::JobTimeout { attempts: 20 }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            error_status(&VecforgeError::Timeout { secs: 120 }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            error_status(&VecforgeError::NoMarkupFound),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&VecforgeError::JobSubmissionFailed {
                status: StatusCode::TOO_MANY_REQUESTS,
                message: "slow down".into(),
            }),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
