//! 사용자 관리 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (로그인, 사용자 생성/조회/삭제)
//! - Argon2 비밀번호 해싱과 JWT Bearer 인증
//! - 역할 기반 접근 제어
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 비밀번호, 토큰, 인증/권한 추출기
//! - [`repository`]: PostgreSQL 사용자 저장소
//! - [`services`]: 시작 시 관리자 계정 생성
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{
    hash_password, verify_password, AdminAuth, AuthError, AuthUser, Claims, OptionalAuth,
    TokenError, TokenService,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use repository::PgUserStore;
pub use routes::create_api_router;
pub use services::{seed_admin, SeedOutcome};
pub use state::{create_test_state, AppState, TEST_JWT_SECRET};
