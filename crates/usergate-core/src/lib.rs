//! # UserGate Core
//!
//! 사용자 API의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 API 서버 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자(Identity) 및 역할(Role) 타입
//! - 사용자 조회/저장소 추상화 (`IdentityStore`, `UserStore`)
//! - 테스트 및 DB 미설정 모드용 인메모리 저장소
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
