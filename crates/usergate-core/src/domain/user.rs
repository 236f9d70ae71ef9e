//! 사용자(Identity) 도메인 모델.
//!
//! 인증 대상이 되는 사용자 레코드와 역할을 정의합니다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 닫힌 집합이며, 모든 권한 판단은 이 열거형에 대한 완전한 match로 이루어집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자 - 사용자 목록 조회 및 삭제 가능
    Admin,
    /// 일반 사용자
    #[default]
    User,
}

impl Role {
    /// 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// 문자열에서 역할 파싱.
    ///
    /// 토큰 클레임과 저장소 값은 항상 소문자로 기록되므로 대소문자를 구분합니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// 관리자 여부.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 선택적 프로필 정보.
///
/// 보안과 무관하며 저장소와 응답 사이에서 그대로 전달됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// 이름
    pub name: Option<String>,
    /// 성
    pub last_name: Option<String>,
    /// 생년월일
    pub birth_date: Option<NaiveDate>,
    /// 도시
    pub city: Option<String>,
    /// 우편번호
    pub postal_code: Option<String>,
}

/// 저장된 사용자 레코드.
///
/// `password_hash`를 포함하므로 의도적으로 `Serialize`를 구현하지 않습니다.
/// 외부 출력은 API 계층의 응답 타입을 통해서만 이루어집니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// 사용자 ID (생성 시 할당, 불변)
    pub id: i64,
    /// 사용자 이름 (고유, 대소문자 구분)
    pub username: String,
    /// PHC 형식 비밀번호 해시
    pub password_hash: String,
    /// 역할
    pub role: Role,
    /// 프로필 정보
    pub profile: Profile,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

/// 새 사용자 생성 입력.
///
/// 비밀번호는 이미 해싱된 상태로 전달되어야 합니다.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub profile: Profile,
}
