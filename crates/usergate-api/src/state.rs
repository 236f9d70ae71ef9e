//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 요청 간에 공유됩니다. 요청 처리 중 변경되는
//! 필드는 없으며, 사용자 데이터의 변경은 저장소 구현체 내부에서만 일어납니다.

use std::sync::Arc;

use usergate_core::{InMemoryUserStore, UserStore};

use crate::auth::TokenService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 저장소 (PostgreSQL 또는 인메모리)
    pub store: Arc<dyn UserStore>,

    /// 토큰 발급/검증 서비스
    pub tokens: Arc<TokenService>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # 인자
    /// * `store` - 사용자 저장소
    /// * `jwt_secret` - 토큰 서명 키
    pub fn new(store: Arc<dyn UserStore>, jwt_secret: &[u8]) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenService::new(jwt_secret)),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 인메모리 저장소를 사용하는 상태.
    ///
    /// `DATABASE_URL` 미설정 개발 모드와 테스트에서 사용합니다.
    pub fn in_memory(jwt_secret: &[u8]) -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()), jwt_secret)
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 저장소 연결 상태.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.ping().await
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend())
            .field("tokens", &self.tokens)
            .field("version", &self.version)
            .finish()
    }
}

/// 테스트용 서명 키.
pub const TEST_JWT_SECRET: &[u8] = b"usergate-test-secret-key-minimum-32-bytes";

/// 테스트용 AppState 생성 (인메모리 저장소, 고정 서명 키).
pub fn create_test_state() -> AppState {
    AppState::in_memory(TEST_JWT_SECRET)
}
