//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템에서 사용하는 liveness/readiness 엔드포인트입니다.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use usergate_core::UserStore;

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "unhealthy")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// 사용자 저장소 상태
    pub store: ComponentStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// 상태 ("up" | "down")
    pub status: String,

    /// 추가 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    /// 정보 포함 정상 상태.
    pub fn up(message: impl Into<String>) -> Self {
        Self {
            status: "up".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: "down".to_string(),
            message: Some(message.into()),
        }
    }
}

/// 간단한 헬스 체크 (liveness probe용).
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "서버 응답 가능"))
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 저장소에 도달할 수 없으면 503을 반환합니다.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "모든 컴포넌트 정상", body = HealthResponse),
        (status = 503, description = "저장소 연결 실패", body = HealthResponse)
    )
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let backend = state.store.backend();

    let (overall, status_code, store_status) = if state.is_store_healthy().await {
        ("healthy", StatusCode::OK, ComponentStatus::up(backend))
    } else {
        (
            "unhealthy",
            StatusCode::SERVICE_UNAVAILABLE,
            ComponentStatus::down(format!("{} 연결 실패", backend)),
        )
    };

    let response = HealthResponse {
        status: overall.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: ComponentHealth {
            store: store_status,
        },
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
