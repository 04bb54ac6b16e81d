//! Response envelope and error mapping.
//!
//! Every response is `{"success": true, "data": ...}` or
//! `{"success": false, "error": "...", "code": "..."}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

use backoffice_core::batch::BatchError;
use backoffice_core::float::FloatError;
use backoffice_core::ledger::LedgerError;
use backoffice_core::recorder::RecorderError;
use backoffice_core::reports::ReportError;
use backoffice_shared::AppError;

/// Successful envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always true.
    pub success: bool,
    /// Payload.
    pub data: T,
}

/// Wraps `data` in a 200 envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
        .into_response()
}

/// Wraps `data` in a 201 envelope.
pub fn created<T: Serialize>(data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
        .into_response()
}

/// Handler result.
pub type ApiResult = Result<Response, ApiError>;

/// API-facing error: an [`AppError`] plus the module's error code.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    code: &'static str,
}

impl ApiError {
    /// Wraps an application error with its own code.
    #[must_use]
    pub fn new(error: AppError) -> Self {
        let code = error.error_code();
        Self { error, code }
    }

    /// Builds an error from a module's status, code and message.
    pub fn from_module(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: AppError::from_status(status, message),
            code,
        }
    }

    /// 400 with a plain message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AppError::Validation(message.into()))
    }

    /// 403 with a plain message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(AppError::Forbidden(message.into()))
    }

    /// 401 with a plain message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AppError::Unauthorized(message.into()))
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.error.is_server_error() {
            error!(error = %self.error, code = self.code, "request failed");
            "An internal error occurred".to_string()
        } else {
            client_message(&self.error)
        };

        (
            status,
            Json(json!({
                "success": false,
                "error": message,
                "code": self.code,
            })),
        )
            .into_response()
    }
}

/// Client-facing text: the module's own message without the variant prefix.
fn client_message(error: &AppError) -> String {
    match error {
        AppError::Unauthorized(m)
        | AppError::Forbidden(m)
        | AppError::NotFound(m)
        | AppError::Validation(m)
        | AppError::Conflict(m)
        | AppError::Database(m)
        | AppError::ExternalService(m)
        | AppError::Internal(m) => m.clone(),
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error)
    }
}

macro_rules! module_error {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(e: $ty) -> Self {
                    Self::from_module(e.http_status_code(), e.error_code(), e.to_string())
                }
            }
        )+
    };
}

module_error!(FloatError, LedgerError, RecorderError, BatchError, ReportError);

impl From<sea_orm::DbErr> for ApiError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::new(AppError::Database(e.to_string()))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::validation(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::validation(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use uuid::Uuid;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_batch_below_issued_keeps_message() {
        let response = ApiError::from(BatchError::BelowIssued(60)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Cannot reduce quantity below issued cards (60)");
        assert_eq!(body["code"], "QUANTITY_BELOW_ISSUED");
    }

    #[tokio::test]
    async fn test_server_errors_hide_detail() {
        let response = ApiError::from(FloatError::Database("relation missing".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_conflict_maps_to_409() {
        let response = ApiError::from(RecorderError::Conflict(Uuid::nil())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "CONCURRENT_MODIFICATION");
    }

    #[tokio::test]
    async fn test_ok_envelope() {
        let response = ok(json!({"id": 1}));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], 1);
    }
}
