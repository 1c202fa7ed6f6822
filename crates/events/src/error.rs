//! 이벤트 파이프라인 에러 타입

use vigil_core::error::VigilError;

/// 이벤트 파이프라인 에러
///
/// 질의/집계 경로는 순수 뷰이므로 에러를 내지 않습니다. 이 타입은
/// 내보내기 직렬화처럼 실패가 실제로 가능한 경계에서만 쓰입니다.
#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    /// CSV 직렬화 실패
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// JSON 직렬화 실패
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<EventsError> for VigilError {
    fn from(err: EventsError) -> Self {
        VigilError::Query(err.to_string())
    }
}
