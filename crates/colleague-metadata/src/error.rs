//! API error type converting failures into Ethos error responses.

use axum::extract::Json;
use axum::response::IntoResponse;
use http::StatusCode;

/// Code used for every error without a more specific one.
pub const DEFAULT_ERROR_CODE: &str = "Global.Internal.Error";

/// Description used for every error without a more specific one.
pub const DEFAULT_ERROR_DESCRIPTION: &str =
    "Unspecified Error on the system which prevented execution.";

/// Code of the error returned for write requests on metadata.
pub const NOT_SUPPORTED_CODE: &str = "Invalid.Operation";

/// Message of the error returned for write requests on metadata.
pub const NOT_SUPPORTED_MESSAGE: &str =
    "The requested operation is not supported. OpenAPI metadata is read only.";

/// Failure of a metadata, manifest or resources request.
///
/// Each kind maps to one HTTP status; the body follows the Ethos error
/// model:
///
/// ```json
/// { "errors": [ { "code": "...", "description": "...", "message": "..." } ] }
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The requested resource or version does not exist.
    #[error("{0}")]
    KeyNotFound(String),

    /// The caller may not read the requested metadata.
    #[error("{0}")]
    Permissions(String),

    /// A request argument was missing or invalid.
    #[error("{0}")]
    Argument(String),

    /// The configuration source failed.
    #[error("{0}")]
    Repository(String),

    /// An error with an explicit Ethos code and description.
    #[error("{message}")]
    IntegrationApi {
        /// Ethos error code.
        code: String,
        /// Short description of the error class.
        description: String,
        /// Detailed message.
        message: String,
    },

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Error with the default code and description.
    #[must_use]
    pub fn integration(message: impl Into<String>) -> Self {
        Self::IntegrationApi {
            code: DEFAULT_ERROR_CODE.to_string(),
            description: DEFAULT_ERROR_DESCRIPTION.to_string(),
            message: message.into(),
        }
    }

    /// Error returned for `PUT`, `POST` and `DELETE` on metadata.
    #[must_use]
    pub fn not_supported() -> Self {
        Self::IntegrationApi {
            code: NOT_SUPPORTED_CODE.to_string(),
            description: "Invalid operation.".to_string(),
            message: NOT_SUPPORTED_MESSAGE.to_string(),
        }
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::KeyNotFound(_) => StatusCode::NOT_FOUND,
            Self::Permissions(_) => StatusCode::FORBIDDEN,
            Self::Argument(_) | Self::Repository(_) | Self::IntegrationApi { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &str {
        match self {
            Self::IntegrationApi { code, .. } => code,
            _ => DEFAULT_ERROR_CODE,
        }
    }

    fn description(&self) -> &str {
        match self {
            Self::IntegrationApi { description, .. } => description,
            _ => DEFAULT_ERROR_DESCRIPTION,
        }
    }
}

impl From<colleague_metadata_openapi::Error> for ApiError {
    fn from(err: colleague_metadata_openapi::Error) -> Self {
        use colleague_metadata_core::Error as CoreError;
        use colleague_metadata_openapi::Error;

        match err {
            Error::Core(CoreError::VersionNotSupported { .. }) => Self::KeyNotFound(err.to_string()),
            Error::Core(CoreError::Source(message)) => Self::Repository(message),
            Error::Publish { .. } => Self::Permissions(err.to_string()),
            Error::InvalidSegment { .. } => Self::Argument(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = serde_json::json!({
            "errors": [{
                "code": self.code(),
                "description": self.description(),
                "message": self.to_string(),
            }]
        });

        (status, Json(body)).into_response()
    }
}

/// Result of a request handler.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;

    /// Compile-time assertion that `ApiError` is `Send + Sync`.
    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    };

    async fn error_body(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_per_kind() {
        assert_eq!(ApiError::KeyNotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Permissions(String::new()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Argument(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Repository(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::integration("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn not_found_body() {
        let (status, json) = error_body(ApiError::KeyNotFound("no persons".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json,
            serde_json::json!({
                "errors": [{
                    "code": "Global.Internal.Error",
                    "description": "Unspecified Error on the system which prevented execution.",
                    "message": "no persons",
                }]
            })
        );
    }

    #[tokio::test]
    async fn not_supported_body() {
        let (status, json) = error_body(ApiError::not_supported()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "Invalid.Operation");
        assert_eq!(json["errors"][0]["message"], NOT_SUPPORTED_MESSAGE);
    }

    #[test]
    fn library_errors_map_to_kinds() {
        let err: ApiError = colleague_metadata_openapi::Error::Core(
            colleague_metadata_core::Error::VersionNotSupported {
                version: "v1".to_string(),
            },
        )
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Requested version is not supported.");

        let err: ApiError = colleague_metadata_openapi::Error::Core(
            colleague_metadata_core::Error::Source("table locked".to_string()),
        )
        .into();
        assert!(matches!(err, ApiError::Repository(ref m) if m == "table locked"));

        let err: ApiError = colleague_metadata_openapi::Error::Publish {
            path: "/docs".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
