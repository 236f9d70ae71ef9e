//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/` - 서비스 정보
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/v1/login` - 로그인
//! - `/v1/users` - 사용자 생성/조회
//! - `/v1/users/{id}` - 사용자 삭제

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{auth_router, LoginRequest, LoginResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use users::{
    users_router, CreateUserRequest, CreateUserResponse, MessageResponse, UserListResponse,
    UserResponse,
};

use axum::{routing::get, Json, Router};
use std::sync::Arc;

use crate::state::AppState;

/// GET / - 서비스 정보
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "UserGate API".to_string(),
    })
}

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .nest("/health", health_router())
        .nest("/v1", auth_router().merge(users_router()))
}
