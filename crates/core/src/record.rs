//! 이벤트 레코드 — 대시보드 데이터 레이어의 기본 단위
//!
//! 에이전트가 기록하는 이벤트는 고정 스키마가 없습니다. 잘 알려진 필드
//! (`timestamp`, `event_type`, `severity` 등)는 항상 기대되지만 필수는
//! 아니며, 누락된 필드는 소비 시점에 명명된 기본값으로 대체됩니다.
//! 어떤 소비자도 필드 누락으로 실패해서는 안 됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 레코드의 내부 표현 — JSON 객체 (키 순서 유지)
pub type Fields = Map<String, Value>;

// --- 잘 알려진 필드명 ---

/// 타임스탬프 필드 (ISO-8601 계열 문자열)
pub const FIELD_TIMESTAMP: &str = "timestamp";
/// 이벤트 타입 필드
pub const FIELD_EVENT_TYPE: &str = "event_type";
/// 심각도 필드
pub const FIELD_SEVERITY: &str = "severity";
/// 호스트명 필드
pub const FIELD_HOSTNAME: &str = "hostname";
/// 사용자 필드
pub const FIELD_USER: &str = "user";
/// 프로세스 필드
pub const FIELD_PROCESS: &str = "process";
/// 명령어 필드
pub const FIELD_COMMAND: &str = "command";
/// 원격 스토어가 삽입 시 부여하는 식별자 — 로컬 로그에는 존재하지 않음
pub const FIELD_ID: &str = "_id";

/// 문자열 필드의 공통 기본값
pub const UNKNOWN: &str = "unknown";
/// 심각도 기본값
pub const DEFAULT_SEVERITY: &str = "low";

/// 스키마 없는 보안 이벤트 레코드
///
/// JSON 객체를 그대로 감싸며, 잘 알려진 필드에 대한 기본값 적용
/// 접근자를 제공합니다. 로그에서 읽힌 뒤에는 불변으로 취급합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord(Fields);

impl EventRecord {
    /// 빈 레코드를 생성합니다.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// JSON 객체에서 레코드를 생성합니다.
    pub fn from_fields(fields: Fields) -> Self {
        Self(fields)
    }

    /// 내부 필드 맵을 반환합니다.
    pub fn fields(&self) -> &Fields {
        &self.0
    }

    /// 필드를 설정한 레코드를 반환합니다 (테스트 및 조립용).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// 문자열 필드를 반환합니다. 필드가 없거나 문자열이 아니면 `None`.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// 문자열 필드를 기본값과 함께 반환합니다.
    fn str_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str {
        self.get_str(field).unwrap_or(default)
    }

    /// 타임스탬프 (기본값: 빈 문자열)
    pub fn timestamp(&self) -> &str {
        self.str_or(FIELD_TIMESTAMP, "")
    }

    /// 이벤트 타입 (기본값: `"unknown"`)
    pub fn event_type(&self) -> &str {
        self.str_or(FIELD_EVENT_TYPE, UNKNOWN)
    }

    /// 심각도 (기본값: `"low"`)
    pub fn severity(&self) -> &str {
        self.str_or(FIELD_SEVERITY, DEFAULT_SEVERITY)
    }

    /// 호스트명 (기본값: `"unknown"`)
    pub fn hostname(&self) -> &str {
        self.str_or(FIELD_HOSTNAME, UNKNOWN)
    }

    /// 사용자 (기본값: `"unknown"`)
    pub fn user(&self) -> &str {
        self.str_or(FIELD_USER, UNKNOWN)
    }

    /// 프로세스 (기본값: `"unknown"`)
    pub fn process(&self) -> &str {
        self.str_or(FIELD_PROCESS, UNKNOWN)
    }

    /// 명령어 (기본값: 빈 문자열)
    pub fn command(&self) -> &str {
        self.str_or(FIELD_COMMAND, "")
    }

    /// 원격 스토어가 부여한 식별자. 로컬 로그 레코드에는 없습니다.
    pub fn id(&self) -> Option<&str> {
        self.get_str(FIELD_ID)
    }

    /// 동기화 중복 제거에 사용하는 자연 키 `(timestamp, command, user)`
    ///
    /// 누락된 필드는 빈 문자열로 취급합니다. 자연 키가 같은 두 레코드는
    /// 다른 필드가 달라도 같은 이벤트로 간주합니다 (hostname은 의도적으로
    /// 키에서 제외됩니다).
    pub fn natural_key(&self) -> (String, String, String) {
        (
            self.timestamp().to_owned(),
            self.command().to_owned(),
            self.str_or(FIELD_USER, "").to_owned(),
        )
    }

    /// 자연 키를 원격 스토어 `find` 쿼리 객체로 변환합니다.
    pub fn natural_key_query(&self) -> Fields {
        let (timestamp, command, user) = self.natural_key();
        let mut query = Map::new();
        query.insert(FIELD_TIMESTAMP.to_owned(), Value::String(timestamp));
        query.insert(FIELD_COMMAND.to_owned(), Value::String(command));
        query.insert(FIELD_USER.to_owned(), Value::String(user));
        query
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {} @ {}",
            self.severity(),
            self.hostname(),
            self.process(),
            self.event_type(),
            self.timestamp(),
        )
    }
}
