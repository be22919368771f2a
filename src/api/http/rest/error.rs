use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{error, warn};

use super::model::ErrorBody;
use crate::core::Error;

impl Error {
    fn status_code(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// What goes into the `error` field: the upstream body when there is one.
    fn public_detail(&self) -> Value {
        match self {
            Self::UpstreamCall {
                body: Some(body), ..
            } if !body.trim().is_empty() => serde_json::from_str(body)
                .unwrap_or_else(|_| Value::String(body.clone())),
            err => Value::String(err.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(message = "Request failed", error = %self);
        } else {
            warn!(message = "Rejected request", error = %self);
        }
        (status, Json(ErrorBody::new(self.public_detail()))).into_response()
    }
}
