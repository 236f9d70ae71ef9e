//! JWT 토큰 처리.
//!
//! HS256으로 서명된 Access Token 발급/검증 로직.
//! 검증은 `(token, secret, now)`만의 순수 함수이며 외부 상태를 조회하지 않습니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use usergate_core::Role;

/// 토큰 수명 (초). 발급 시점부터 고정 1일이며 호출별로 바꿀 수 없습니다.
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// 토큰 수명.
pub fn token_lifetime() -> Duration {
    Duration::seconds(TOKEN_LIFETIME_SECS)
}

/// 검증된 토큰 클레임.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub subject_id: i64,
    /// 사용자 역할
    pub role: Role,
    /// Expiration - 만료 시각 (Unix timestamp)
    pub exp: i64,
}

/// 토큰에 기록되는 클레임 (wire 형식).
///
/// `{"id": "42", "role": "user", "exp": 1700000000}`
#[derive(Debug, Serialize)]
struct WireClaims<'a> {
    id: String,
    role: &'a str,
    exp: i64,
}

/// 서명 검증 후 구조 검사를 위해 모든 필드를 선택적으로 받는 클레임.
#[derive(Debug, Deserialize)]
struct RawClaims {
    id: Option<String>,
    role: Option<String>,
    exp: Option<i64>,
}

/// JWT 처리 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(String),
    #[error("토큰 서명이 유효하지 않습니다")]
    InvalidSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("잘못된 토큰 형식")]
    Malformed,
}

/// 토큰 발급/검증 서비스.
///
/// 서명 키는 프로세스 시작 시 한 번 로드되어 이후 변경되지 않습니다.
/// 키를 교체하면 이전에 발급된 모든 토큰이 즉시 무효가 됩니다.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// 대칭 키로 서비스 생성.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 만료는 호출자가 넘긴 `now` 기준으로 직접 검사
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Access Token 발급.
    ///
    /// # Arguments
    ///
    /// * `subject_id` - 사용자 ID
    /// * `role` - 사용자 역할
    /// * `now` - 발급 시각 (만료 = now + 1일)
    pub fn issue(&self, subject_id: i64, role: Role, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = WireClaims {
            id: subject_id.to_string(),
            role: role.as_str(),
            exp: (now + token_lifetime()).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// 토큰 검증.
    ///
    /// 검사 순서: 서명 → 만료 → 클레임 구조.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<RawClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;
        let raw = data.claims;

        let exp = raw.exp.ok_or(TokenError::Malformed)?;
        if exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        let subject_id = raw
            .id
            .as_deref()
            .and_then(|id| id.parse::<i64>().ok())
            .ok_or(TokenError::Malformed)?;
        let role = raw
            .role
            .as_deref()
            .and_then(Role::parse)
            .ok_or(TokenError::Malformed)?;

        Ok(Claims {
            subject_id,
            role,
            exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-testing-minimum-32-chars";

    fn service() -> TokenService {
        TokenService::new(TEST_SECRET)
    }

    fn sign_raw(payload: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let now = Utc::now();
        let token = service().issue(42, Role::User, now).unwrap();

        let claims = service().verify(&token, now).unwrap();
        assert_eq!(claims.subject_id, 42);
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp, now.timestamp() + TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn test_token_is_url_safe_compact() {
        let token = service().issue(1, Role::Admin, Utc::now()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'));
    }

    #[test]
    fn test_wire_format_claims() {
        let now = Utc::now();
        let token = service().issue(7, Role::Admin, now).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(TEST_SECRET),
            &validation,
        )
        .unwrap();

        assert_eq!(data.claims["id"], json!("7"));
        assert_eq!(data.claims["role"], json!("admin"));
        assert_eq!(data.claims["exp"], json!(now.timestamp() + TOKEN_LIFETIME_SECS));
    }

    #[test]
    fn test_expired_token() {
        let issued = Utc::now() - Duration::days(2);
        let token = service().issue(1, Role::User, issued).unwrap();

        assert_eq!(service().verify(&token, Utc::now()), Err(TokenError::Expired));
    }

    #[test]
    fn test_expiry_is_evaluated_against_given_now() {
        let issued = Utc::now();
        let token = service().issue(1, Role::User, issued).unwrap();

        assert!(service().verify(&token, issued + Duration::hours(23)).is_ok());
        // exp > now 이어야 하므로 정확히 만료 시각이면 실패
        assert_eq!(
            service().verify(&token, issued + token_lifetime()),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let now = Utc::now();
        let token = service().issue(1, Role::User, now).unwrap();

        let other = TokenService::new(b"wrong-secret-key-for-testing-minimum-32-chars");
        assert_eq!(other.verify(&token, now), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload() {
        let now = Utc::now();
        let token = service().issue(1, Role::User, now).unwrap();
        let forged = service().issue(1, Role::Admin, now).unwrap();

        // 원래 서명에 관리자 페이로드를 이어 붙임
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(service().verify(&tampered, now), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let now = Utc::now();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &json!({"id": "1", "role": "admin", "exp": now.timestamp() + 60}),
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert_eq!(service().verify(&token, now), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert_eq!(
            service().verify("invalid.token.here", Utc::now()),
            Err(TokenError::Malformed)
        );
        assert_eq!(service().verify("", Utc::now()), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_claims_are_malformed() {
        let now = Utc::now();
        let exp = now.timestamp() + 60;

        let no_role = sign_raw(json!({"id": "1", "exp": exp}));
        assert_eq!(service().verify(&no_role, now), Err(TokenError::Malformed));

        let no_id = sign_raw(json!({"role": "user", "exp": exp}));
        assert_eq!(service().verify(&no_id, now), Err(TokenError::Malformed));

        let no_exp = sign_raw(json!({"id": "1", "role": "user"}));
        assert_eq!(service().verify(&no_exp, now), Err(TokenError::Malformed));
    }

    #[test]
    fn test_invalid_claim_values_are_malformed() {
        let now = Utc::now();
        let exp = now.timestamp() + 60;

        let bad_id = sign_raw(json!({"id": "abc", "role": "user", "exp": exp}));
        assert_eq!(service().verify(&bad_id, now), Err(TokenError::Malformed));

        let bad_role = sign_raw(json!({"id": "1", "role": "superuser", "exp": exp}));
        assert_eq!(service().verify(&bad_role, now), Err(TokenError::Malformed));
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let issued = Utc::now() - Duration::days(3);
        let token = service().issue(1, Role::User, issued).unwrap();

        let other = TokenService::new(b"wrong-secret-key-for-testing-minimum-32-chars");
        assert_eq!(
            other.verify(&token, Utc::now()),
            Err(TokenError::InvalidSignature)
        );
    }
}
