//! OpenAPI 문서화 설정.
//!
//! utoipa로 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use usergate_core::Role;

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, CreateUserRequest, CreateUserResponse, HealthResponse,
    LoginRequest, LoginResponse, MessageResponse, UserListResponse, UserResponse,
};

/// UserGate API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "UserGate API",
        version = "0.1.0",
        description = r#"
# UserGate REST API

사용자 등록, 로그인, 관리자용 사용자 관리를 제공합니다.

## 인증

`POST /v1/login`으로 받은 토큰을 `Authorization: Bearer <token>` 헤더로 전달합니다.
토큰은 발급 후 24시간 동안 유효합니다.
"#
    ),
    tags(
        (name = "auth", description = "로그인"),
        (name = "users", description = "사용자 관리"),
        (name = "health", description = "헬스 체크")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            Role,
            ApiErrorResponse,
            LoginRequest,
            LoginResponse,
            UserResponse,
            CreateUserRequest,
            CreateUserResponse,
            UserListResponse,
            MessageResponse,
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
        )
    ),
    paths(
        crate::routes::auth::login,
        crate::routes::users::create_user,
        crate::routes::users::list_users,
        crate::routes::users::delete_user,
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
    )
)]
pub struct ApiDoc;

/// `bearer` 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
