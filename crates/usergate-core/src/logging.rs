//! tracing을 사용한 로깅 인프라.
//!
//! 출력 형식:
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: 운영환경/로그 집계용 JSON 형식
//! - **compact**: 로그 크기를 줄이기 위한 간결한 형식
//!
//! `RUST_LOG`가 설정되어 있으면 설정 파일의 레벨보다 우선합니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;
use crate::error::{GateError, GateResult};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식 (개발용)
    #[default]
    Pretty,
    /// 로그 집계용 JSON 형식 (운영용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 초기화 옵션.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "usergate_api=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// span 이벤트 포함 여부 (진입/종료)
    pub with_span_events: bool,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_span_events: false,
            with_file: false,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// span 이벤트를 활성화합니다.
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }
}

impl From<&LoggingConfig> for LogConfig {
    /// 알 수 없는 형식 문자열은 pretty로 대체합니다.
    fn from(settings: &LoggingConfig) -> Self {
        let format = settings.format.parse().unwrap_or_default();
        Self::new(settings.level.clone()).with_format(format)
    }
}

fn fmt_layer(config: &LogConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let span_events = if config.with_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_target(true)
        .with_span_events(span_events);

    match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// 프로세스당 한 번만 호출해야 하며, 두 번째 호출은 에러를 반환합니다.
///
/// # 예제
///
/// ```no_run
/// use usergate_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::new("debug").with_format(LogFormat::Json);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> GateResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| GateError::Config(format!("잘못된 로그 레벨 '{}': {}", config.level, e)))?;

    tracing_subscriber::registry()
        .with(fmt_layer(&config))
        .with(env_filter)
        .try_init()
        .map_err(|e| GateError::Internal(format!("로깅 초기화 실패: {}", e)))?;

    tracing::info!(
        format = ?config.format,
        level = %config.level,
        "Logging initialized"
    );

    Ok(())
}
