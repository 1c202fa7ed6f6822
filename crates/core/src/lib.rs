#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metrics;
pub mod record;
pub mod store;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, StoreError, VigilError};

// 설정
pub use config::{EventsConfig, GeneralConfig, QueryConfig, StoreConfig, VigilConfig};

// 이벤트 레코드
pub use record::{EventRecord, Fields};

// 스토어 trait
pub use store::EventStore;
