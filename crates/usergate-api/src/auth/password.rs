//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
}

/// 존재하지 않는 사용자로 로그인할 때 검증에 사용하는 해시.
///
/// 사용자 존재 여부와 무관하게 로그인 응답 시간이 같도록 합니다.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("usergate-timing-equalizer").ok());

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하여 비밀번호를 해싱합니다.
/// 호출마다 새 솔트가 생성되므로 같은 비밀번호도 매번 다른 해시가 나옵니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (알고리즘 파라미터와 솔트 포함)
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 저장된 해시에 포함된 솔트와 파라미터로 다시 계산하여 상수 시간으로 비교합니다.
/// 불일치뿐 아니라 해시 형식이 잘못된 경우에도 `false`를 반환합니다.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// 존재하지 않는 사용자에 대해 검증 비용만 소모합니다. 항상 `false`.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
