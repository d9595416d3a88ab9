//! Spec §6/§7's two HTTP failure modes: bad query parameters map to 400,
//! store failures map to 500. Neither is logged above debug (spec §7's
//! "User/API" error kind).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid query parameter {name}: {reason}")]
    BadQuery { name: &'static str, reason: String },
    #[error(transparent)]
    Store(#[from] expiry_store::Error),
    #[error(transparent)]
    Rpc(#[from] rpc_pool::RpcError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::BadQuery { .. } => {
                tracing::debug!(error = %self, "rejected request with bad query parameter");
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            ApiError::Store(_) | ApiError::Rpc(_) => {
                tracing::warn!(error = %self, "analytics api request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
