#![doc = include_str!("../README.md")]
//!
//! # 프로토콜 개요
//!
//! ```text
//! frame    = uint32_be length + length bytes of UTF-8 JSON
//! request  = {"database", "operation": "find"|"insert"|"delete",
//!             "collection", "query" | "data"}
//! response = {"status": "success"|"error", "data"?, "message"?, "deleted"?}
//! ```
//!
//! 하나의 연결 위에서는 엄격한 요청/응답 교대만 허용됩니다.
//! 응답은 도착 순서로만 요청과 대응되므로 파이프라이닝은 불가능합니다.

pub mod client;
pub mod codec;
pub mod protocol;

// --- 주요 타입 re-export ---

pub use client::StoreClient;
pub use codec::{MAX_FRAME_LEN, read_frame, write_frame};
pub use protocol::{Operation, Request, Response, Status};
