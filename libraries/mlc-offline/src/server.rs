/// HTTP front for the offline worker
use crate::error::WorkerError;
use crate::lifecycle::{WorkerMessage, WorkerState};
use crate::worker::OfflineWorker;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use mlc_core::{AssetRequest, AssetResponse};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

/// Control channel path
pub const MESSAGE_PATH: &str = "/__worker/message";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub state: WorkerState,
}

/// Router serving every request through `worker`
pub fn router(worker: Arc<OfflineWorker>) -> Router {
    Router::new()
        .route(MESSAGE_PATH, post(post_message))
        .fallback(fetch_through_worker)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(worker)
}

/// POST /__worker/message - deliver a control message
async fn post_message(
    State(worker): State<Arc<OfflineWorker>>,
    Json(message): Json<WorkerMessage>,
) -> Result<Json<MessageResponse>, WorkerError> {
    let state = worker.handle_message(&message).await?;
    Ok(Json(MessageResponse { state }))
}

/// Any other request - cache-first fetch
async fn fetch_through_worker(
    State(worker): State<Arc<OfflineWorker>>,
    method: Method,
    uri: Uri,
) -> Result<Response, WorkerError> {
    // path and query replace the origin's; a `//host` path must not resolve
    // to another authority
    let mut url = worker.config().origin.clone();
    url.set_path(uri.path());
    url.set_query(uri.query());

    let request = AssetRequest::new(method.as_str(), url);
    let response = worker.fetch(&request).await?;
    Ok(into_http(response))
}

fn into_http(asset: AssetResponse) -> Response {
    let status = StatusCode::from_u16(asset.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::new(Body::from(asset.body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in &asset.headers {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            continue;
        };
        if name == header::CONTENT_LENGTH
            || name == header::TRANSFER_ENCODING
            || name == header::CONNECTION
        {
            continue;
        }
        headers.append(name, value);
    }

    response
}

impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkerError::Install { .. } | WorkerError::Network(_) => StatusCode::BAD_GATEWAY,
            WorkerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WorkerError::Cache(msg) => {
                tracing::error!("Cache error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
