//! Conversion of [`PluginError`] into HTTP responses.

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use apis::{ErrorStatus, PluginError};
use thiserror::Error;

/// Error returned by route handlers and extractors.
///
/// Rendered as an [`ErrorStatus`] JSON body with the status code of the
/// underlying [`apis::PluginErrorKind`].
#[derive(Debug, Error)]
#[error(transparent)]
pub struct RouteError(#[from] PluginError);

impl RouteError {
    /// The wrapped plugin error.
    pub fn plugin_error(&self) -> &PluginError {
        &self.0
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self(PluginError::bad_request(message))
    }
}

impl ResponseError for RouteError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "plugin request failed");
        } else {
            tracing::debug!(error = %self.0, "plugin request rejected");
        }

        let body = match serde_json::to_string(&ErrorStatus::from(&self.0)) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize error status");
                return HttpResponse::InternalServerError().finish();
            }
        };
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(body)
    }
}

/// Result type of route handlers.
pub type RouteResult<T> = Result<T, RouteError>;
