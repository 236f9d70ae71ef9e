//! UserGate API 서버.
//!
//! 설정을 로드하고 사용자 저장소를 준비한 뒤 Axum 서버를 시작합니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, Router};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use usergate_api::openapi::swagger_ui_router;
use usergate_api::repository::PgUserStore;
use usergate_api::routes::create_api_router;
use usergate_api::services::seed_admin;
use usergate_api::state::AppState;
use usergate_core::{init_logging, AppConfig, DatabaseConfig, InMemoryUserStore, LogConfig, UserStore};

/// 요청 전체 타임아웃
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 사용자 저장소 생성.
///
/// 데이터베이스 URL이 없으면 재시작 시 데이터가 사라지는 인메모리 저장소를 사용합니다.
async fn create_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    match config.url.as_deref() {
        Some(url) => {
            let store = PgUserStore::connect(url, config)
                .await
                .context("PostgreSQL 연결 실패")?;
            store
                .ensure_schema()
                .await
                .context("users 테이블 생성 실패")?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory user store (data is lost on restart)");
            Ok(Arc::new(InMemoryUserStore::new()))
        }
    }
}

/// CORS 레이어 설정.
///
/// 허용 origin 목록이 비어 있으면 모든 origin을 허용합니다 (개발 모드).
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<_> = origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if parsed.is_empty() {
        if !origins.is_empty() {
            warn!("cors_origins contains no valid origins, allowing any");
        } else {
            warn!("cors_origins not set, allowing any origin (development mode)");
        }
        layer.allow_origin(AllowOrigin::any())
    } else {
        info!("CORS configured with {} allowed origins", parsed.len());
        layer
            .allow_origin(AllowOrigin::list(parsed))
            .allow_credentials(true)
    }
}

/// 전체 라우터 구성.
fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    create_api_router()
        .with_state(state)
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT))
        .layer(cors_layer(cors_origins))
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI=1`이면 스펙을 stdout으로 출력합니다.
/// 출력했으면 `true`를 반환합니다.
fn handle_export_openapi() -> anyhow::Result<bool> {
    use usergate_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if !(export_flag || export_env) {
        return Ok(false);
    }

    println!("{}", serde_json::to_string_pretty(&ApiDoc::openapi())?);
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    if handle_export_openapi()? {
        return Ok(());
    }

    let config = AppConfig::load_default().context("설정 로드 실패")?;
    init_logging(LogConfig::from(&config.logging))?;

    info!("Starting UserGate API server...");

    let jwt_secret = config.auth.jwt_secret()?;

    let store = create_store(&config.database).await.map_err(|e| {
        error!(error = %e, "사용자 저장소 초기화 실패");
        e
    })?;

    match seed_admin(store.as_ref(), &config.admin).await {
        Ok(outcome) => info!(?outcome, "Admin seed completed"),
        Err(e) if !e.is_fatal() => {
            warn!(error = %e, "Admin seed failed, continuing without default admin")
        }
        Err(e) => return Err(e.into()),
    }

    let state = Arc::new(AppState::new(store, jwt_secret.expose_secret().as_bytes()));
    info!(version = %state.version, store = state.store.backend(), "Application state initialized");

    let app = create_router(state, &config.cors_origins);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("{} 바인딩 실패", addr))?;

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    let shutdown_token = CancellationToken::new();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
        _ = shutdown_token.cancelled() => {}
    }

    shutdown_token.cancel();
}
