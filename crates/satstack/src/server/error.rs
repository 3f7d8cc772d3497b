use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use satstack_core::CoreError;

// ==============================================================================
// Error Type
// ==============================================================================

#[derive(Debug)]
pub(crate) enum AppError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Client mistakes are 400, unknown objects 404, and anything the node got
/// wrong (or could not be reached for) 502.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedHash { .. } | CoreError::InvalidBlockReference(_) => {
                Self::BadRequest(err.to_string())
            }
            CoreError::BlockNotFound(_) | CoreError::TxNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            CoreError::Rpc(rpc) => Self::BadGateway(format!("bitcoin rpc error: {rpc}")),
            CoreError::MalformedTransaction(_)
            | CoreError::AmountParse { .. }
            | CoreError::InvalidTxData(_) => Self::BadGateway(err.to_string()),
            CoreError::Config(_) => Self::Internal(err.to_string()),
        }
    }
}
