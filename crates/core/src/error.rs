//! 에러 타입 — 도메인별 에러 정의

/// Vigil 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 원격 스토어 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 쿼리/집계 레이어 에러
    #[error("query error: {0}")]
    Query(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 원격 스토어 에러
///
/// 와이어 프로토콜과 스토어 클라이언트가 공유하는 에러 분류입니다.
/// `Framing`과 `Io`는 전송 계층 장애로 클라이언트의 1회 재연결-재시도
/// 대상이 되고, 나머지는 즉시 호출자에게 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 프레이밍 위반 — 잘못된 길이 접두사, 잘린 프레임, 프레임 도중 연결 종료
    #[error("framing error: {0}")]
    Framing(String),

    /// 페이로드가 유효한 JSON이 아님 — 피어가 프로토콜을 벗어난 상태
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// 소켓을 열거나 다시 열 수 없음 — 재시도 예산 소진 후 표면화
    #[error("connection error: {addr}: {reason}")]
    Connection { addr: String, reason: String },

    /// 스토어가 정상 형식의 에러 응답을 반환함 (`status: error`)
    #[error("store rejected request: {0}")]
    Rejected(String),

    /// 소켓 I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// 전송 계층 장애 여부 — 재연결-재시도 대상인지 판단합니다.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Framing(_) | Self::Io(_))
    }
}
