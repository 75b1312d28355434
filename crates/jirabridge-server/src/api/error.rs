use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// HTTP surface of a failed ticket operation.
#[derive(Debug)]
pub struct ApiError(pub jirabridge_jira::Error);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use jirabridge_jira::Error;

        match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::InvalidTransition { .. } => StatusCode::CONFLICT,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<jirabridge_jira::Error> for ApiError {
    fn from(err: jirabridge_jira::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!("API Error: {}", message);
        } else {
            warn!("API Client Error: {}", message);
        }

        let body = Json(ErrorBody {
            error: self.0.kind(),
            message,
        });

        (status, body).into_response()
    }
}
