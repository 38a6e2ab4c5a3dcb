use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};

use rota_core::query::{QueryReply, QueryRequest};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/assistant/query", post(run_query))
}

/// Reads the manager identity forwarded by the auth proxy. The header wins
/// over anything in the body; the body field only exists for library
/// callers.
fn extract_manager_id(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get("x-manager-id") else {
        return Ok(None);
    };
    let manager_id = value.to_str().map_err(|_| AppError::Validation {
        message: "x-manager-id must be a valid UTF-8 string".to_string(),
        field: Some("headers.x-manager-id".to_string()),
        received: None,
        docs_hint: None,
    })?;
    Ok(Some(manager_id.trim().to_string()))
}

/// One assistant turn: a free-form question in, a rendered answer or a
/// clarification out. Thread state is persisted between calls via the
/// returned `thread_id`.
#[utoipa::path(
    post,
    path = "/v1/assistant/query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "A reply or a clarification question", body = QueryReply),
        (status = 400, description = "Malformed request", body = rota_core::error::ApiError),
        (status = 429, description = "Rate limited", body = rota_core::error::ApiError),
        (status = 500, description = "Pipeline failure", body = rota_core::error::ApiError)
    ),
    tag = "assistant"
)]
pub async fn run_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut request): Json<QueryRequest>,
) -> Result<Json<QueryReply>, AppError> {
    if let Some(manager_id) = extract_manager_id(&headers)? {
        request.manager_id = manager_id;
    }
    if request.manager_id.trim().is_empty() {
        return Err(AppError::Validation {
            message: "x-manager-id header is required".to_string(),
            field: Some("headers.x-manager-id".to_string()),
            received: None,
            docs_hint: Some(
                "Pass the manager's identity as forwarded by the platform's auth layer."
                    .to_string(),
            ),
        });
    }

    let reply = state.assistant.handle_query(request).await?;
    Ok(Json(reply))
}
