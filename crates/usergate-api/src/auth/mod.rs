//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`password`]: Argon2id 비밀번호 해싱/검증
//! - [`TokenService`]: HS256 토큰 발급/검증 (수명 1일 고정)
//! - [`AuthUser`], [`OptionalAuth`]: 요청의 Bearer 토큰을 사용자로 해석하는 추출기
//! - [`AdminAuth`], [`require_role`]: 역할 검사
//!
//! # 알려진 제약
//!
//! 토큰은 서버에 저장되지 않으므로 만료 전에 개별적으로 무효화할 수 없습니다
//! (로그아웃, 폐기 목록 없음). 서명 키를 교체하면 모든 토큰이 한꺼번에 무효가 됩니다.
//! 삭제된 사용자의 토큰은 요청마다 사용자를 다시 조회하므로 즉시 거부됩니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn admin_handler(AdminAuth(admin): AdminAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", admin.username)
//! }
//! ```

mod jwt;
mod middleware;
pub mod password;
mod roles;

pub use jwt::{token_lifetime, Claims, TokenError, TokenService, TOKEN_LIFETIME_SECS};
pub use middleware::{authenticate, extract_bearer, AdminAuth, AuthError, AuthUser, OptionalAuth};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::require_role;
