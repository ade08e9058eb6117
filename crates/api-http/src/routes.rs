//! Route table

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `GET /version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Clone)]
struct AppState {
    version: Arc<str>,
}

/// Build the health router
///
/// # Arguments
/// * `version` - Reported verbatim by `GET /version`
///
/// # Example
/// ```text
/// let app = router(sqs_listener_core::VERSION);
/// axum::serve(listener, app).await?;
/// ```
pub fn router(version: impl Into<String>) -> Router {
    let state = AppState {
        version: Arc::from(version.into()),
    };

    Router::new()
        .route("/status", get(status))
        .route("/version", get(version_handler))
        .with_state(state)
}

async fn status() -> &'static str {
    "Success"
}

async fn version_handler(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.version.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn call(uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router("1.2.3")
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_status_says_success() {
        let (status, body) = call("/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Success");
    }

    #[tokio::test]
    async fn test_version_reports_configured_version() {
        let (status, body) = call("/version").await;
        assert_eq!(status, StatusCode::OK);

        let parsed: VersionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.version, "1.2.3");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (status, _) = call("/jobs").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
