//! 역할 기반 접근 제어 (RBAC).
//!
//! 인증 가드가 확인한 사용자에 대해 엔드포인트가 요구하는 역할을 검사합니다.
//! 요청 간 공유 상태가 없는 순수 함수입니다.

use usergate_core::{Identity, Role};

use super::middleware::AuthError;

/// 역할 요구 사항 검사.
///
/// 사용자의 역할이 요구 역할과 같으면 통과, 다르면 [`AuthError::InsufficientRole`].
///
/// # Arguments
///
/// * `required` - 엔드포인트가 요구하는 역할
/// * `identity` - 인증 가드가 확인한 사용자
pub fn require_role(required: Role, identity: &Identity) -> Result<(), AuthError> {
    let allowed = match (required, identity.role) {
        (Role::Admin, Role::Admin) => true,
        (Role::Admin, Role::User) => false,
        (Role::User, Role::User) => true,
        (Role::User, Role::Admin) => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthError::InsufficientRole { required })
    }
}
