//! Axum용 JWT 인증 추출기.
//!
//! 요청마다 다음 상태를 거칩니다:
//!
//! ```text
//! NoToken → TokenExtracted → ClaimsValid → Authenticated
//!    └──────────┴──────────────┴──────────→ Unauthorized
//! ```
//!
//! 실패 사유(서명 불일치, 만료, 형식 오류, 사용자 없음)는 debug 로그로만 남기고
//! 호출자에게는 구분 없이 401을 반환합니다.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use usergate_core::{Identity, IdentityStore, Role};

use super::jwt::{TokenError, TokenService};
use super::roles::require_role;
use crate::state::AppState;

/// 인증 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("유효하지 않은 토큰: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("토큰의 사용자가 존재하지 않습니다")]
    UnknownIdentity,
    #[error("{required} 권한이 필요합니다")]
    InsufficientRole { required: Role },
    #[error("사용자 조회 실패: {0}")]
    Internal(String),
}

impl AuthError {
    /// 401로 응답해야 하는 인증 실패인지 여부.
    pub fn is_unauthenticated(&self) -> bool {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::UnknownIdentity => true,
            AuthError::InsufficientRole { .. } | AuthError::Internal(_) => false,
        }
    }
}

/// `Authorization` 헤더 값에서 Bearer 토큰 추출.
///
/// 스킴 이름은 대소문자를 구분하지 않습니다.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;

    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// 요청 하나에 대한 인증 절차.
///
/// 토큰을 검증한 뒤 저장소에서 사용자를 다시 조회합니다. 토큰 발급 이후 삭제된
/// 사용자는 [`AuthError::UnknownIdentity`]로 거부됩니다.
pub async fn authenticate<I>(
    header: Option<&str>,
    tokens: &TokenService,
    store: &I,
    now: DateTime<Utc>,
) -> Result<Identity, AuthError>
where
    I: IdentityStore + ?Sized,
{
    let token = extract_bearer(header)?;
    let claims = tokens.verify(token, now)?;

    match store.find_by_id(claims.subject_id).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err(AuthError::UnknownIdentity),
        Err(e) => Err(AuthError::Internal(e.to_string())),
    }
}

fn log_rejection(err: &AuthError) {
    match err {
        AuthError::Internal(msg) => error!(error = %msg, "Identity lookup failed"),
        other if other.is_unauthenticated() => {
            debug!(reason = %other, "Request rejected by auth guard")
        }
        other => info!(reason = %other, "Request denied by role guard"),
    }
}

/// 인증된 사용자 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(AuthUser(identity): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 같은 요청에서 이미 인증된 경우 재사용
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(AuthUser(identity.clone()));
        }

        let state = Arc::<AppState>::from_ref(state);

        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                let err = AuthError::InvalidAuthHeader;
                log_rejection(&err);
                err
            })?),
            None => None,
        };

        let identity = authenticate(header, &state.tokens, state.store.as_ref(), Utc::now())
            .await
            .inspect_err(log_rejection)?;

        parts.extensions.insert(identity.clone());
        Ok(AuthUser(identity))
    }
}

/// 선택적 인증 추출기.
///
/// `Authorization` 헤더가 없으면 `None`을 반환합니다.
/// 헤더가 있는데 유효하지 않으면 익명으로 취급하지 않고 401로 거부합니다.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuth(None));
        }

        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        Ok(OptionalAuth(Some(identity)))
    }
}

/// Admin 권한을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub Identity);

impl<S> FromRequestParts<S> for AdminAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        require_role(Role::Admin, &identity).inspect_err(log_rejection)?;
        Ok(AdminAuth(identity))
    }
}
