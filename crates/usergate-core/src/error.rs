//! 서버 부트스트랩 및 공통 에러 타입.
//!
//! 요청 처리 중의 에러는 API 계층의 `ApiError`로 표현되고,
//! 이 모듈은 설정 로드, 저장소 초기화 등 프로세스 수준의 에러를 정의합니다.

use thiserror::Error;

use crate::domain::StoreError;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum GateError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type GateResult<T> = Result<T, GateError>;

impl GateError {
    /// 프로세스를 중단해야 하는 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GateError::Config(_))
    }
}

impl From<config::ConfigError> for GateError {
    fn from(err: config::ConfigError) -> Self {
        GateError::Config(err.to_string())
    }
}

impl From<StoreError> for GateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(msg) => GateError::Database(msg),
            other => GateError::Internal(other.to_string()),
        }
    }
}
