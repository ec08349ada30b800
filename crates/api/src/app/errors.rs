use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use jobgate_infra::backend::BackendError;

pub fn backend_error_to_response(err: BackendError) -> axum::response::Response {
    match err {
        BackendError::Unavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "backend_unavailable",
            err.to_string(),
        ),
        BackendError::Timeout(_) => {
            json_error(StatusCode::GATEWAY_TIMEOUT, "backend_timeout", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
