//! 통합 API 에러 타입.
//!
//! 핸들러와 가드는 [`ApiError`] 값을 반환하고, HTTP 상태 코드 매핑은
//! 이 모듈의 `IntoResponse` 구현 한 곳에서만 이루어집니다.

use axum::{
    extract::rejection::JsonRejection,
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use usergate_core::StoreError;

use crate::auth::{AuthError, PasswordError};

/// 에러 응답 본문.
///
/// # 예시
///
/// ```json
/// {
///   "code": "UNAUTHORIZED",
///   "message": "인증 정보를 확인할 수 없습니다",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "BAD_REQUEST", "UNAUTHORIZED", "FORBIDDEN")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 타임스탬프 포함 에러 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// API 에러 분류.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 필수 필드 누락, 잘못된 값
    #[error("{0}")]
    BadRequest(String),

    /// 알 수 없는 사용자 또는 잘못된 비밀번호 (두 경우를 구분하지 않음)
    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 토큰 누락/무효/만료, 토큰의 사용자 없음
    #[error("인증 정보를 확인할 수 없습니다")]
    Unauthorized,

    /// 역할 부족 또는 금지된 작업
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// 내부 에러. 상세 내용은 로그에만 남깁니다.
    #[error("내부 서버 오류가 발생했습니다")]
    Internal(String),
}

impl ApiError {
    /// HTTP 상태 코드와 에러 코드.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "Internal error while handling request");
        }

        let mut response = (status, Json(ApiErrorResponse::new(code, self.to_string()))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientRole { required } => {
                ApiError::Forbidden(format!("{} 권한이 필요합니다", required))
            }
            AuthError::Internal(msg) => ApiError::Internal(msg),
            AuthError::MissingToken
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::UnknownIdentity => ApiError::Unauthorized,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => ApiError::Conflict("이미 존재하는 사용자 이름입니다".to_string()),
            StoreError::Database(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("잘못된 요청 본문: {}", rejection.body_text()))
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
