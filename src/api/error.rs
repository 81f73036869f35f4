use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{debug, error};

use crate::api::models::ErrorResponse;
use crate::backend::BackendError;
use crate::forms::FieldErrors;

/// API 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("인증이 필요합니다")]
    MissingToken,
    #[error("입력값을 확인하세요")]
    Validation(FieldErrors),
    #[error("플랜을 찾을 수 없습니다: {0}")]
    PlanNotFound(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED"),
            ApiError::PlanNotFound(_) => (StatusCode::NOT_FOUND, "PLAN_NOT_FOUND"),
            ApiError::Backend(e) => match e {
                BackendError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE"),
                BackendError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
                BackendError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                BackendError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                BackendError::AlreadyExists(_) => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
                BackendError::Request(_) | BackendError::Decode(_) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!("❌ 요청 처리 실패: {} ({})", self, code);
        } else {
            debug!("요청 거부: {} ({})", self, code);
        }

        let message = self.to_string();
        let fields = match self {
            ApiError::Validation(fields) => Some(fields),
            _ => None,
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
                fields,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_mapping() {
        let cases = [
            (BackendError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            (BackendError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (BackendError::AlreadyExists("email".into()), StatusCode::CONFLICT),
            (BackendError::Decode("bad json".into()), StatusCode::BAD_GATEWAY),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }

    #[test]
    fn test_validation_is_unprocessable() {
        let mut fields = FieldErrors::new();
        fields.insert("amount", "Valor mínimo: R$ 200,00");
        let response = ApiError::Validation(fields).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
