//! 설정 관리 — vigil.toml 파싱 및 런타임 설정
//!
//! [`VigilConfig`]는 데이터 레이어 전체의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`VIGIL_STORE_HOST=db01` 형식)
//! 3. 설정 파일 (`vigil.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), vigil_core::error::VigilError> {
//! use vigil_core::config::VigilConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = VigilConfig::load("vigil.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = VigilConfig::parse("[store]\nhost = \"db01\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, VigilError};

/// Vigil 통합 설정
///
/// `vigil.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 원격 스토어 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// 로컬 이벤트 로그 설정
    #[serde(default)]
    pub events: EventsConfig,
    /// 쿼리 기본값 설정
    #[serde(default)]
    pub query: QueryConfig,
}

impl VigilConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VigilError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, VigilError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VigilError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                VigilError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, VigilError> {
        toml::from_str(toml_str).map_err(|e| {
            VigilError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VIGIL_{SECTION}_{FIELD}`
    /// 예: `VIGIL_STORE_HOST=db01`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VIGIL_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VIGIL_GENERAL_LOG_FORMAT");

        // Store
        override_string(&mut self.store.host, "VIGIL_STORE_HOST");
        override_u16(&mut self.store.port, "VIGIL_STORE_PORT");
        override_string(&mut self.store.database, "VIGIL_STORE_DATABASE");
        override_string(&mut self.store.collection, "VIGIL_STORE_COLLECTION");

        // Events
        override_string(&mut self.events.log_file, "VIGIL_EVENTS_LOG_FILE");

        // Query
        override_i64(&mut self.query.default_hours, "VIGIL_QUERY_DEFAULT_HOURS");
        override_usize(
            &mut self.query.default_page_size,
            "VIGIL_QUERY_DEFAULT_PAGE_SIZE",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), VigilError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // store 주소 검증
        if self.store.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.host".to_owned(),
                reason: "host must not be empty".to_owned(),
            }
            .into());
        }
        if self.store.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.port".to_owned(),
                reason: "port must be non-zero".to_owned(),
            }
            .into());
        }
        if self.store.database.is_empty() || self.store.collection.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.database".to_owned(),
                reason: "database and collection must not be empty".to_owned(),
            }
            .into());
        }

        // 이벤트 로그 경로 검증
        if self.events.log_file.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "events.log_file".to_owned(),
                reason: "log_file must not be empty".to_owned(),
            }
            .into());
        }

        // 쿼리 기본값 검증
        if self.query.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "query.default_page_size".to_owned(),
                reason: "page size must be at least 1".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 원격 스토어 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 스토어 서버 호스트
    pub host: String,
    /// 스토어 서버 포트
    pub port: u16,
    /// 데이터베이스 이름
    pub database: String,
    /// 컬렉션 이름
    pub collection: String,
}

impl StoreConfig {
    /// `host:port` 형식의 연결 주소를 반환합니다.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8080,
            database: "security_db".to_owned(),
            collection: "security_events".to_owned(),
        }
    }
}

/// 로컬 이벤트 로그 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// 에이전트가 기록하는 JSON Lines 로그 파일 경로
    pub log_file: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            log_file: "/tmp/security_events.json".to_owned(),
        }
    }
}

/// 쿼리 기본값 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// 기본 최근성 윈도우 (시간). 0 이하면 전체 기간.
    pub default_hours: i64,
    /// 페이지당 기본 이벤트 수
    pub default_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_hours: 24,
            default_page_size: 50,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_i64(target: &mut i64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<i64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i64 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = VigilConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.store.host, "localhost");
        assert_eq!(config.store.port, 8080);
        assert_eq!(config.store.database, "security_db");
        assert_eq!(config.store.collection, "security_events");
        assert_eq!(config.events.log_file, "/tmp/security_events.json");
        assert_eq!(config.query.default_hours, 24);
        assert_eq!(config.query.default_page_size, 50);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = VigilConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn store_addr_joins_host_and_port() {
        let config = StoreConfig::default();
        assert_eq!(config.addr(), "localhost:8080");
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = VigilConfig::parse("").unwrap();
        assert_eq!(config.store.port, 8080);
        assert_eq!(config.query.default_hours, 24);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[store]
host = "db01"
port = 9000

[events]
log_file = "/var/lib/vigil/events.json"
"#;
        let config = VigilConfig::parse(toml).unwrap();
        assert_eq!(config.store.host, "db01");
        assert_eq!(config.store.port, 9000);
        // database는 기본값 유지
        assert_eq!(config.store.database, "security_db");
        assert_eq!(config.events.log_file, "/var/lib/vigil/events.json");
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let result = VigilConfig::parse("invalid = [[[toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            VigilError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = VigilConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_empty_host() {
        let mut config = VigilConfig::default();
        config.store.host = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn validate_rejects_zero_port() {
        let mut config = VigilConfig::default();
        config.store.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let mut config = VigilConfig::default();
        config.query.default_page_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("page size"));
    }

    #[test]
    #[serial]
    fn env_override_store_host() {
        let mut config = VigilConfig::default();
        // SAFETY: 테스트는 serial로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("VIGIL_STORE_HOST", "db-override") };
        config.apply_env_overrides();
        assert_eq!(config.store.host, "db-override");
        unsafe { std::env::remove_var("VIGIL_STORE_HOST") };
    }

    #[test]
    #[serial]
    fn env_override_invalid_port_keeps_original() {
        let mut config = VigilConfig::default();
        // SAFETY: 테스트는 serial로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("VIGIL_STORE_PORT", "not-a-port") };
        config.apply_env_overrides();
        assert_eq!(config.store.port, 8080); // 원래 값 유지
        unsafe { std::env::remove_var("VIGIL_STORE_PORT") };
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = VigilConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = VigilConfig::parse(&toml_str).unwrap();
        assert_eq!(config.store.addr(), parsed.store.addr());
        assert_eq!(config.events.log_file, parsed.events.log_file);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = VigilConfig::from_file("/nonexistent/path/vigil.toml").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            VigilError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
