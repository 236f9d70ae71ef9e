//! User persistence repository.
//!
//! PostgreSQL 기반 [`UserStore`] 구현. 비밀번호는 `password` 컬럼에 해시로만 저장됩니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use usergate_core::{
    DatabaseConfig, Identity, IdentityStore, NewIdentity, Profile, Role, StoreError, StoreResult,
    UserStore,
};

const SCHEMA_SQL: &str = include_str!("../../migrations/0001_users.sql");

/// Database representation of a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for Identity {
    type Error = StoreError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role = Role::parse(&record.role).ok_or_else(|| {
            StoreError::Database(format!(
                "user {} has unknown role '{}'",
                record.id, record.role
            ))
        })?;

        Ok(Identity {
            id: record.id,
            username: record.username,
            password_hash: record.password,
            role,
            profile: Profile {
                name: record.name,
                last_name: record.last_name,
                birth_date: record.birth_date,
                city: record.city,
                postal_code: record.postal_code,
            },
            created_at: record.created_at,
        })
    }
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

/// PostgreSQL 사용자 저장소.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 설정으로 연결 풀을 만들고 연결을 확인합니다.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        info!(max_connections = config.max_connections, "Connected to PostgreSQL");

        Ok(Self::new(pool))
    }

    /// `users` 테이블이 없으면 생성합니다.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Identity>> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Identity::try_from)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Identity>> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Identity::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, input: NewIdentity) -> StoreResult<Identity> {
        let result = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, password, role, name, last_name, birth_date, city, postal_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .bind(&input.profile.name)
        .bind(&input.profile.last_name)
        .bind(input.profile.birth_date)
        .bind(&input.profile.city)
        .bind(&input.profile.postal_code)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Identity::try_from(record),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Conflict(input.username))
            }
            Err(e) => Err(db_error(e)),
        }
    }

    async fn list(&self) -> StoreResult<Vec<Identity>> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Identity::try_from)
            .collect()
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
