#![doc = include_str!("../README.md")]
//!
//! # 읽기 경로
//!
//! 모든 질의는 로컬 로그를 우선 읽습니다. 로그가 비어 있을 때만
//! 원격 스토어로 폴백하며, 실시간 모드에서는 폴백 없이 로그만 읽습니다.
//! 질의 계층은 로그에 대한 순수한 뷰로서, 필드 누락이나 깨진
//! 타임스탬프 때문에 실패하지 않습니다.

pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod reader;
pub mod source;
pub mod sync;

// --- 주요 타입 re-export ---

pub use engine::{
    AgentActivity, CountEntry, EventFilter, EventPage, LoginEntry, QueryEngine, TimelineBucket,
};
pub use error::EventsError;
pub use export::{ExportFormat, ExportPayload};
pub use filter::{filter_by_recency, parse_timestamp, search};
pub use reader::LogReader;
pub use source::EventSource;
pub use sync::{Synchronizer, sync_records};
