//! 기본 관리자 계정 생성.
//!
//! 서버 시작 시 설정된 관리자 계정이 없으면 한 번 생성합니다.
//! 이미 같은 사용자 이름이 있으면 아무것도 변경하지 않습니다.

use secrecy::ExposeSecret;
use tracing::{info, warn};

use usergate_core::{
    AdminSeedConfig, GateError, GateResult, IdentityStore, NewIdentity, Profile, Role, StoreError,
    UserStore,
};

use crate::auth::hash_password;

/// 관리자 시드 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// 새로 생성됨
    Created { id: i64 },
    /// 같은 사용자 이름이 이미 존재
    AlreadyExists { id: i64, role: Role },
    /// 설정 누락으로 건너뜀
    Skipped,
}

/// 설정된 기본 관리자를 생성합니다.
pub async fn seed_admin(store: &dyn UserStore, config: &AdminSeedConfig) -> GateResult<SeedOutcome> {
    let (Some(username), Some(password)) = (config.username.as_deref(), config.password.as_ref())
    else {
        if config.username.is_some() || config.password.is_some() {
            warn!("admin.username과 admin.password가 모두 필요합니다. 관리자 생성을 건너뜁니다");
        }
        return Ok(SeedOutcome::Skipped);
    };

    if let Some(existing) = store.find_by_username(username).await? {
        if !existing.role.is_admin() {
            warn!(username, role = %existing.role, "Seed admin username belongs to a non-admin account");
        }
        info!(username, "Admin user already exists");
        return Ok(SeedOutcome::AlreadyExists {
            id: existing.id,
            role: existing.role,
        });
    }

    let password_hash =
        hash_password(password.expose_secret()).map_err(|e| GateError::Internal(e.to_string()))?;

    let created = store
        .create(NewIdentity {
            username: username.to_string(),
            password_hash,
            role: Role::Admin,
            profile: Profile {
                name: config.name.clone(),
                last_name: config.last_name.clone(),
                ..Default::default()
            },
        })
        .await;

    match created {
        Ok(admin) => {
            info!(user_id = admin.id, username, "Admin user created");
            Ok(SeedOutcome::Created { id: admin.id })
        }
        // 다른 인스턴스가 동시에 생성한 경우
        Err(StoreError::Conflict(_)) => {
            let existing = store
                .find_by_username(username)
                .await?
                .ok_or_else(|| GateError::Internal(format!("admin '{}' vanished after conflict", username)))?;
            Ok(SeedOutcome::AlreadyExists {
                id: existing.id,
                role: existing.role,
            })
        }
        Err(e) => Err(e.into()),
    }
}
