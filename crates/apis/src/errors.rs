//! Error taxonomy shared by plugins, the route layer and the client.
//!
//! [`PluginError`] is what every capability returns. Its [`PluginErrorKind`]
//! decides the HTTP status the route layer answers with, and the error travels
//! over the wire as an [`ErrorStatus`] document shaped like a Kubernetes
//! `Status` object so callers can decode it back into the same kind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Classification of a plugin failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginErrorKind {
    /// The request is malformed (bad path parameter, invalid payload, ...).
    BadRequest,
    /// Credentials are missing or rejected by the integrated tool.
    Unauthorized,
    /// Credentials are valid but lack permission.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The resource already exists or was modified concurrently.
    Conflict,
    /// The plugin does not implement the requested capability.
    NotImplemented,
    /// The integrated tool is unreachable or overloaded.
    Unavailable,
    /// Any other failure.
    Internal,
}

impl PluginErrorKind {
    /// HTTP status code answered for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            PluginErrorKind::BadRequest => 400,
            PluginErrorKind::Unauthorized => 401,
            PluginErrorKind::Forbidden => 403,
            PluginErrorKind::NotFound => 404,
            PluginErrorKind::Conflict => 409,
            PluginErrorKind::NotImplemented => 501,
            PluginErrorKind::Unavailable => 503,
            PluginErrorKind::Internal => 500,
        }
    }

    /// Kind implied by an HTTP status code.
    ///
    /// Unknown 4xx codes map to [`PluginErrorKind::BadRequest`], everything else
    /// unknown to [`PluginErrorKind::Internal`].
    pub fn from_status_code(code: u16) -> Self {
        match code {
            400 => PluginErrorKind::BadRequest,
            401 => PluginErrorKind::Unauthorized,
            403 => PluginErrorKind::Forbidden,
            404 => PluginErrorKind::NotFound,
            409 => PluginErrorKind::Conflict,
            501 => PluginErrorKind::NotImplemented,
            502..=504 => PluginErrorKind::Unavailable,
            400..=499 => PluginErrorKind::BadRequest,
            _ => PluginErrorKind::Internal,
        }
    }

    /// Machine-readable reason string used in [`ErrorStatus::reason`].
    pub fn reason(self) -> &'static str {
        match self {
            PluginErrorKind::BadRequest => "BadRequest",
            PluginErrorKind::Unauthorized => "Unauthorized",
            PluginErrorKind::Forbidden => "Forbidden",
            PluginErrorKind::NotFound => "NotFound",
            PluginErrorKind::Conflict => "Conflict",
            PluginErrorKind::NotImplemented => "NotImplemented",
            PluginErrorKind::Unavailable => "ServiceUnavailable",
            PluginErrorKind::Internal => "InternalError",
        }
    }

    /// Parses a reason string produced by [`PluginErrorKind::reason`].
    pub fn from_reason(reason: &str) -> Option<Self> {
        Some(match reason {
            "BadRequest" => PluginErrorKind::BadRequest,
            "Unauthorized" => PluginErrorKind::Unauthorized,
            "Forbidden" => PluginErrorKind::Forbidden,
            "NotFound" => PluginErrorKind::NotFound,
            "Conflict" | "AlreadyExists" => PluginErrorKind::Conflict,
            "NotImplemented" => PluginErrorKind::NotImplemented,
            "ServiceUnavailable" => PluginErrorKind::Unavailable,
            "InternalError" => PluginErrorKind::Internal,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Plugin error
// ---------------------------------------------------------------------------

/// Failure returned by a plugin capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct PluginError {
    /// Failure classification.
    pub kind: PluginErrorKind,
    /// Human-readable description, safe to show to callers.
    pub message: String,
}

impl PluginError {
    /// Creates an error of the given kind.
    pub fn new(kind: PluginErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// [`PluginErrorKind::BadRequest`] error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(PluginErrorKind::BadRequest, message)
    }

    /// [`PluginErrorKind::Unauthorized`] error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(PluginErrorKind::Unauthorized, message)
    }

    /// [`PluginErrorKind::NotFound`] error for a named resource.
    pub fn not_found(resource: &str, name: impl std::fmt::Display) -> Self {
        Self::new(
            PluginErrorKind::NotFound,
            format!("{resource} \"{name}\" not found"),
        )
    }

    /// [`PluginErrorKind::Conflict`] error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(PluginErrorKind::Conflict, message)
    }

    /// [`PluginErrorKind::NotImplemented`] error for a capability.
    pub fn not_implemented(capability: &str) -> Self {
        Self::new(
            PluginErrorKind::NotImplemented,
            format!("capability {capability} is not implemented by this plugin"),
        )
    }

    /// [`PluginErrorKind::Internal`] error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(PluginErrorKind::Internal, message)
    }

    /// Returns `true` for [`PluginErrorKind::NotFound`].
    pub fn is_not_found(&self) -> bool {
        self.kind == PluginErrorKind::NotFound
    }
}

impl From<crate::AuthError> for PluginError {
    fn from(err: crate::AuthError) -> Self {
        PluginError::unauthorized(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

/// JSON body of an error response, shaped like a Kubernetes `Status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStatus {
    /// Always `"Status"`.
    pub kind: String,
    /// Always `"v1"`.
    pub api_version: String,
    /// Always `"Failure"`.
    pub status: String,
    /// Human-readable description.
    pub message: String,
    /// Machine-readable reason (see [`PluginErrorKind::reason`]).
    pub reason: String,
    /// HTTP status code.
    pub code: u16,
}

impl From<&PluginError> for ErrorStatus {
    fn from(err: &PluginError) -> Self {
        Self {
            kind: "Status".to_string(),
            api_version: "v1".to_string(),
            status: "Failure".to_string(),
            message: err.message.clone(),
            reason: err.kind.reason().to_string(),
            code: err.kind.status_code(),
        }
    }
}

impl From<ErrorStatus> for PluginError {
    fn from(status: ErrorStatus) -> Self {
        let kind = PluginErrorKind::from_reason(&status.reason)
            .unwrap_or_else(|| PluginErrorKind::from_status_code(status.code));
        PluginError::new(kind, status.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mirrors_kubernetes_status() {
        let err = PluginError::not_found("branch", "main");
        let json = serde_json::to_value(ErrorStatus::from(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "Status",
                "apiVersion": "v1",
                "status": "Failure",
                "message": "branch \"main\" not found",
                "reason": "NotFound",
                "code": 404,
            })
        );
    }

    #[test]
    fn status_decodes_back_into_the_same_kind() {
        for kind in [
            PluginErrorKind::BadRequest,
            PluginErrorKind::Unauthorized,
            PluginErrorKind::Forbidden,
            PluginErrorKind::NotFound,
            PluginErrorKind::Conflict,
            PluginErrorKind::NotImplemented,
            PluginErrorKind::Unavailable,
            PluginErrorKind::Internal,
        ] {
            let err = PluginError::new(kind, "boom");
            let back = PluginError::from(ErrorStatus::from(&err));
            assert_eq!(back, err);
        }
    }

    #[test]
    fn unknown_reasons_fall_back_to_the_status_code() {
        let status = ErrorStatus {
            kind: "Status".into(),
            api_version: "v1".into(),
            status: "Failure".into(),
            message: "slow down".into(),
            reason: "TooManyRequests".into(),
            code: 429,
        };
        assert_eq!(PluginError::from(status).kind, PluginErrorKind::BadRequest);
        assert_eq!(PluginErrorKind::from_status_code(502), PluginErrorKind::Unavailable);
        assert_eq!(PluginErrorKind::from_status_code(418), PluginErrorKind::BadRequest);
        assert_eq!(PluginErrorKind::from_status_code(599), PluginErrorKind::Internal);
    }

    #[test]
    fn auth_errors_become_unauthorized() {
        let err: PluginError = crate::AuthError::MissingField("token").into();
        assert_eq!(err.kind, PluginErrorKind::Unauthorized);
    }
}
