//! 설정 관리.
//!
//! 설정은 다음 순서로 병합됩니다 (뒤가 우선):
//!
//! 1. 구조체 기본값
//! 2. 설정 파일 (`config/default.toml`, 선택)
//! 3. `USERGATE__` 접두사 환경 변수 (예: `USERGATE__SERVER__PORT=8080`)
//! 4. 기존 배포 호환 환경 변수: `JWT_SECRET`, `DATABASE_URL`, `API_HOST`, `API_PORT`

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GateError, GateResult};

/// JWT 서명 키 최소 길이 (바이트). HS256 키는 해시 출력 크기 이상이어야 합니다.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 기본 관리자 계정 설정
    pub admin: AdminSeedConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// CORS 허용 origin 목록 (비어 있으면 모든 origin 허용)
    pub cors_origins: Vec<String>,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

impl ServerConfig {
    /// `host:port` 문자열.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 연결 URL. 없으면 인메모리 저장소를 사용합니다.
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 인증 설정.
///
/// 토큰 수명은 설정 항목이 아니라 고정 상수입니다.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT 서명 키 (필수)
    #[serde(deserialize_with = "deserialize_secret")]
    pub jwt_secret: Option<SecretString>,
}

impl AuthConfig {
    /// 서명 키 반환. 누락되었거나 너무 짧으면 에러.
    pub fn jwt_secret(&self) -> GateResult<&SecretString> {
        let secret = self.jwt_secret.as_ref().ok_or_else(|| {
            GateError::Config("JWT_SECRET (auth.jwt_secret) 설정이 필요합니다".to_string())
        })?;

        if secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(GateError::Config(format!(
                "JWT 서명 키는 최소 {}바이트 이상이어야 합니다",
                MIN_JWT_SECRET_LEN
            )));
        }

        Ok(secret)
    }
}

/// 기본 관리자 계정 설정.
///
/// `username`과 `password`가 모두 있을 때만 시작 시 관리자 계정을 생성합니다.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminSeedConfig {
    pub username: Option<String>,
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: Option<SecretString>,
    pub name: Option<String>,
    pub last_name: Option<String>,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "usergate_api=info,usergate_core=info,tower_http=info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 건너뜁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> GateResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("USERGATE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true),
            )
            // 기존 배포 호환 변수
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("API_HOST").ok())?
            .set_override_option("server.port", std::env::var("API_PORT").ok())?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> GateResult<Self> {
        Self::load("config/default.toml")
    }

    /// 필수 항목 검증.
    pub fn validate(&self) -> GateResult<()> {
        self.auth.jwt_secret()?;
        Ok(())
    }
}
