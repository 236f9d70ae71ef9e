//! 사용자 관리 API 라우트
//!
//! # 엔드포인트
//!
//! - `POST /v1/users` - 사용자 생성 (공개, 관리자 역할 생성은 관리자만)
//! - `GET /v1/users` - 전체 사용자 조회 (관리자 전용)
//! - `DELETE /v1/users/{id}` - 사용자 삭제 (관리자 전용, 자기 자신 삭제 불가)

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;
use validator::Validate;

use usergate_core::{Identity, IdentityStore, NewIdentity, Profile, Role, UserStore};

use crate::auth::{hash_password, AdminAuth, OptionalAuth};
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 사용자 응답 (비밀번호 해시 제외)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// 사용자 ID
    pub id: i64,
    /// 사용자 이름
    pub username: String,
    /// 역할
    pub role: Role,
    /// 이름 (없으면 null)
    pub name: Option<String>,
    /// 성 (없으면 null)
    pub last_name: Option<String>,
    /// 생년월일 (YYYY-MM-DD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    /// 도시
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// 우편번호
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        let profile = identity.profile.clone();
        Self {
            id: identity.id,
            username: identity.username.clone(),
            role: identity.role,
            name: profile.name,
            last_name: profile.last_name,
            birth_date: profile.birth_date,
            city: profile.city,
            postal_code: profile.postal_code,
            created_at: identity.created_at,
        }
    }
}

/// 사용자 생성 요청
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// 사용자 이름 (필수, 고유)
    #[validate(required(message = "username은 필수입니다"), length(min = 1, max = 100))]
    pub username: Option<String>,
    /// 비밀번호 (필수)
    #[validate(required(message = "password는 필수입니다"), length(min = 1, max = 256))]
    pub password: Option<String>,
    /// 역할 (기본값: user)
    pub role: Option<Role>,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[serde(alias = "last_name")]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[serde(alias = "birth_date")]
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[serde(alias = "postal_code")]
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
}

/// 사용자 생성 응답
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: UserResponse,
}

/// 사용자 목록 응답
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// 사용자 목록
    pub users: Vec<UserResponse>,
    /// 총 개수
    pub total: usize,
}

/// 메시지 응답
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// 검증 에러를 400 응답으로 변환.
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    ApiError::BadRequest(format!("입력값 검증 실패: {}", errors))
}

// ================================================================================================
// Handlers
// ================================================================================================

/// POST /v1/users - 사용자 생성
///
/// 인증 없이 호출할 수 있지만, `admin` 역할 계정은 관리자 토큰이 있어야 생성할 수 있습니다.
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "사용자 생성 성공", body = CreateUserResponse),
        (status = 400, description = "필수 필드 누락 또는 잘못된 값", body = ApiErrorResponse),
        (status = 403, description = "관리자 역할 생성 권한 없음", body = ApiErrorResponse),
        (status = 409, description = "사용자 이름 중복", body = ApiErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    OptionalAuth(caller): OptionalAuth,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    let Json(request) = payload?;
    request.validate().map_err(validation_error)?;

    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(ApiError::BadRequest("username과 password는 필수입니다".to_string()));
    };

    let role = request.role.unwrap_or_default();
    if role.is_admin() && !caller.as_ref().is_some_and(|c| c.role.is_admin()) {
        return Err(ApiError::Forbidden(
            "관리자 계정은 관리자만 생성할 수 있습니다".to_string(),
        ));
    }

    if state.store.find_by_username(&username).await?.is_some() {
        return Err(ApiError::Conflict("이미 존재하는 사용자 이름입니다".to_string()));
    }

    // Argon2는 CPU 집약적이므로 blocking 풀에서 실행
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {}", e)))??;

    let identity = state
        .store
        .create(NewIdentity {
            username,
            password_hash,
            role,
            profile: Profile {
                name: request.name,
                last_name: request.last_name,
                birth_date: request.birth_date,
                city: request.city,
                postal_code: request.postal_code,
            },
        })
        .await?;

    info!(
        user_id = identity.id,
        username = %identity.username,
        role = %identity.role,
        created_by = caller.as_ref().map(|c| c.id),
        "User created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "사용자가 생성되었습니다".to_string(),
            user: UserResponse::from(&identity),
        }),
    ))
}

/// GET /v1/users - 전체 사용자 조회
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "사용자 목록", body = UserListResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 403, description = "관리자 전용", body = ApiErrorResponse)
    )
)]
pub async fn list_users(
    AdminAuth(admin): AdminAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserListResponse>> {
    debug!(admin_id = admin.id, "사용자 목록 조회");

    let users: Vec<UserResponse> = state
        .store
        .list()
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();
    let total = users.len();

    Ok(Json(UserListResponse { users, total }))
}

/// DELETE /v1/users/{id} - 사용자 삭제
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "users",
    security(("bearer" = [])),
    params(
        ("id" = i64, Path, description = "삭제할 사용자 ID")
    ),
    responses(
        (status = 200, description = "삭제 성공", body = MessageResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 403, description = "관리자 전용 또는 자기 자신 삭제 시도", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    )
)]
pub async fn delete_user(
    AdminAuth(admin): AdminAuth,
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(user_id) =
        path.map_err(|e| ApiError::BadRequest(format!("잘못된 사용자 ID: {}", e.body_text())))?;

    if admin.id == user_id {
        return Err(ApiError::Forbidden("자기 자신은 삭제할 수 없습니다".to_string()));
    }

    if !state.store.delete(user_id).await? {
        return Err(ApiError::NotFound("사용자를 찾을 수 없습니다".to_string()));
    }

    info!(user_id, deleted_by = admin.id, "User deleted");

    Ok(Json(MessageResponse {
        message: "사용자가 삭제되었습니다".to_string(),
    }))
}

/// 사용자 관리 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/{id}", delete(delete_user))
}
