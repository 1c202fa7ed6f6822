//! 메트릭 상수 등록
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다. 각 크레이트는 이 상수를
//! 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `vigil_`
//! - 모듈명: `store_`, `sync_`, `reader_`
//! - 접미어: `_total` (counter)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 스토어 연산 레이블 키 (find, insert, delete)
pub const LABEL_OPERATION: &str = "operation";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Store client 메트릭 ───────────────────────────────────────────

/// 스토어: 전송된 요청 수 (counter, label: operation)
pub const STORE_REQUESTS_TOTAL: &str = "vigil_store_requests_total";

/// 스토어: 재연결 시도 수 (counter, label: result)
pub const STORE_RECONNECTS_TOTAL: &str = "vigil_store_reconnects_total";

// ─── Synchronizer 메트릭 ───────────────────────────────────────────

/// 동기화: 원격 스토어에 삽입된 레코드 수 (counter)
pub const SYNC_EVENTS_ADDED_TOTAL: &str = "vigil_sync_events_added_total";

/// 동기화: 삽입 실패로 건너뛴 레코드 수 (counter)
pub const SYNC_EVENTS_SKIPPED_TOTAL: &str = "vigil_sync_events_skipped_total";

// ─── Reader 메트릭 ─────────────────────────────────────────────────

/// 리더: 파싱 실패로 건너뛴 로그 라인 수 (counter)
pub const READER_LINES_SKIPPED_TOTAL: &str = "vigil_reader_lines_skipped_total";
