use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use energy_client::StorageError;

/// Messages per offending field, in field-name order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid reading: {}", field_names(.0))]
    Validation(FieldErrors),
    #[error("malformed request body: {detail}")]
    MalformedBody { status: StatusCode, detail: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn field_names(errors: &FieldErrors) -> String {
    errors.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Self::MalformedBody { status, detail } => {
                (status, Json(serde_json::json!({ "detail": detail }))).into_response()
            }
            // Details stay in the server log.
            Self::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "storage unavailable" })),
            )
                .into_response(),
        }
    }
}
