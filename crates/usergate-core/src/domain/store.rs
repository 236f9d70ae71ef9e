//! 사용자 저장소 trait 및 인메모리 구현.
//!
//! 인증 계층은 [`IdentityStore`]를 통해 사용자를 읽기만 하고,
//! 생성/삭제는 [`UserStore`] 구현체(PostgreSQL, 인메모리)가 전담합니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::user::{Identity, NewIdentity};

// ================================================================================================
// Error Types
// ================================================================================================

/// 저장소 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// 사용자 이름 중복
    #[error("이미 존재하는 사용자 이름: {0}")]
    Conflict(String),
    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ================================================================================================
// Traits
// ================================================================================================

/// 사용자 조회 기능.
///
/// 인증 가드가 의존하는 유일한 저장소 기능입니다. 구현체는 요청 간 공유되므로
/// 내부적으로 동시 접근을 처리해야 합니다.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// ID로 사용자 조회.
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Identity>>;

    /// 사용자 이름으로 조회 (대소문자 구분).
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Identity>>;
}

/// 사용자 영속화 기능.
#[async_trait]
pub trait UserStore: IdentityStore {
    /// 새 사용자 생성. 이름이 중복되면 [`StoreError::Conflict`].
    async fn create(&self, input: NewIdentity) -> StoreResult<Identity>;

    /// 전체 사용자 목록 (ID 오름차순).
    async fn list(&self) -> StoreResult<Vec<Identity>>;

    /// 사용자 삭제. 삭제되었으면 `true`.
    async fn delete(&self, id: i64) -> StoreResult<bool>;

    /// 저장소 연결 상태 확인.
    async fn ping(&self) -> bool {
        true
    }

    /// 저장소 종류 (헬스 체크 표시용).
    fn backend(&self) -> &'static str;
}

// ================================================================================================
// In-memory implementation
// ================================================================================================

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, Identity>,
}

/// 인메모리 사용자 저장소.
///
/// 테스트와 `DATABASE_URL` 미설정 개발 모드에서 사용합니다.
/// 프로세스 종료 시 모든 데이터가 사라집니다.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Identity>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Identity>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, input: NewIdentity) -> StoreResult<Identity> {
        let mut inner = self.inner.write().await;

        // 이름 검사와 삽입을 같은 write lock 안에서 수행
        if inner.users.values().any(|u| u.username == input.username) {
            return Err(StoreError::Conflict(input.username));
        }

        inner.next_id += 1;
        let identity = Identity {
            id: inner.next_id,
            username: input.username,
            password_hash: input.password_hash,
            role: input.role,
            profile: input.profile,
            created_at: Utc::now(),
        };
        inner.users.insert(identity.id, identity.clone());

        Ok(identity)
    }

    async fn list(&self) -> StoreResult<Vec<Identity>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
