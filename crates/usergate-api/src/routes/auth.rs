//! 로그인 엔드포인트.
//!
//! `POST /v1/login` - 사용자 이름과 비밀번호를 확인하고 1일짜리 Bearer 토큰을 발급합니다.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

use usergate_core::IdentityStore;

use crate::auth::password::{verify_against_dummy, verify_password};
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::routes::users::{validation_error, UserResponse};
use crate::state::AppState;

/// 로그인 요청
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(required(message = "username은 필수입니다"), length(min = 1))]
    pub username: Option<String>,
    #[validate(required(message = "password는 필수입니다"), length(min = 1))]
    pub password: Option<String>,
}

/// 로그인 응답
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    /// Bearer 토큰 (HS256, 24시간 유효)
    pub token: String,
    pub user: UserResponse,
}

/// POST /v1/login
///
/// 존재하지 않는 사용자와 잘못된 비밀번호는 같은 응답을 반환합니다.
/// 사용자가 없을 때도 더미 해시를 검증하여 응답 시간 차이를 줄입니다.
#[utoipa::path(
    post,
    path = "/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 400, description = "필수 필드 누락", body = ApiErrorResponse),
        (status = 401, description = "잘못된 자격 증명", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    request.validate().map_err(validation_error)?;

    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(ApiError::BadRequest("username과 password는 필수입니다".to_string()));
    };

    let identity = state.store.find_by_username(&username).await?;
    let stored_hash = identity.as_ref().map(|i| i.password_hash.clone());

    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => verify_against_dummy(&password),
    })
    .await
    .map_err(|e| ApiError::Internal(format!("verification task failed: {}", e)))?;

    let identity = match identity {
        Some(identity) if verified => identity,
        _ => {
            warn!(username = %username, "Login failed");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = state
        .tokens
        .issue(identity.id, identity.role, Utc::now())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(user_id = identity.id, role = %identity.role, "Login succeeded");

    Ok(Json(LoginResponse {
        message: "로그인 성공".to_string(),
        token,
        user: UserResponse::from(&identity),
    }))
}

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use tower::ServiceExt;
    use usergate_core::{NewIdentity, Role, UserStore};

    async fn app_with_user() -> Router {
        let state = Arc::new(create_test_state());
        state
            .store
            .create(NewIdentity {
                username: "alice".to_string(),
                password_hash: hash_password("secret123").unwrap(),
                role: Role::User,
                profile: Default::default(),
            })
            .await
            .unwrap();

        auth_router().with_state(state)
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn error_body(response: axum::response::Response) -> ApiErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_success_returns_token() {
        let app = app_with_user().await;

        let response = app
            .oneshot(login_request(r#"{"username":"alice","password":"secret123"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: LoginResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.token.is_empty());
        assert_eq!(body.user.username, "alice");
        assert_eq!(body.user.role, Role::User);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let app = app_with_user().await;

        let wrong_password = app
            .clone()
            .oneshot(login_request(r#"{"username":"alice","password":"nope12345"}"#))
            .await
            .unwrap();
        let unknown_user = app
            .oneshot(login_request(r#"{"username":"mallory","password":"secret123"}"#))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

        let a = error_body(wrong_password).await;
        let b = error_body(unknown_user).await;
        assert_eq!(a.code, b.code);
        assert_eq!(a.message, b.message);
    }

    #[tokio::test]
    async fn test_missing_fields_is_bad_request() {
        let app = app_with_user().await;

        for body in [r#"{"username":"alice"}"#, r#"{"password":"x"}"#, r#"{}"#, "not json"] {
            let response = app.clone().oneshot(login_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        }
    }
}
