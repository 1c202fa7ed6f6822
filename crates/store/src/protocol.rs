//! 요청/응답 엔벨로프
//!
//! 원격 스토어와 주고받는 프레임 페이로드의 JSON 형태를 정의합니다.
//! `find`/`delete` 요청은 `query` 객체를, `insert` 요청은 `data` 객체를
//! 싣습니다. 모든 요청은 다음 요청 전에 정확히 하나의 응답을 받습니다.

use serde::{Deserialize, Serialize};

use vigil_core::record::{EventRecord, Fields};

/// 스토어 연산 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// 쿼리에 일치하는 레코드 조회
    Find,
    /// 레코드 삽입
    Insert,
    /// 쿼리에 일치하는 레코드 삭제
    Delete,
}

impl Operation {
    /// 연산의 와이어 이름 (메트릭 레이블에도 사용)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }
}

/// 스토어 요청 엔벨로프
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// 데이터베이스 이름
    pub database: String,
    /// 연산 종류
    pub operation: Operation,
    /// 컬렉션 이름
    pub collection: String,
    /// 조회/삭제 쿼리 (find, delete)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Fields>,
    /// 삽입할 레코드 (insert)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EventRecord>,
}

impl Request {
    /// `find` 요청을 생성합니다.
    pub fn find(database: impl Into<String>, collection: impl Into<String>, query: Fields) -> Self {
        Self {
            database: database.into(),
            operation: Operation::Find,
            collection: collection.into(),
            query: Some(query),
            data: None,
        }
    }

    /// `insert` 요청을 생성합니다.
    pub fn insert(
        database: impl Into<String>,
        collection: impl Into<String>,
        record: EventRecord,
    ) -> Self {
        Self {
            database: database.into(),
            operation: Operation::Insert,
            collection: collection.into(),
            query: None,
            data: Some(record),
        }
    }

    /// `delete` 요청을 생성합니다.
    pub fn delete(
        database: impl Into<String>,
        collection: impl Into<String>,
        query: Fields,
    ) -> Self {
        Self {
            database: database.into(),
            operation: Operation::Delete,
            collection: collection.into(),
            query: Some(query),
            data: None,
        }
    }
}

/// 응답 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// 연산 성공
    Success,
    /// 연산 실패 — `message`에 사유가 담김
    Error,
}

/// 스토어 응답 엔벨로프
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// 응답 상태
    pub status: Status,
    /// 조회 결과 (find 성공 시, 없으면 빈 시퀀스로 취급)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<EventRecord>>,
    /// 에러 메시지 (status = error 시)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 삭제된 레코드 수 (delete 성공 시)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
}

impl Response {
    /// 성공 응답을 생성합니다 (테스트 더블 및 목 서버용).
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            data: None,
            message: None,
            deleted: None,
        }
    }

    /// 조회 결과를 실은 성공 응답을 생성합니다.
    pub fn success_with_data(data: Vec<EventRecord>) -> Self {
        Self {
            data: Some(data),
            ..Self::success()
        }
    }

    /// 삭제 건수를 실은 성공 응답을 생성합니다.
    pub fn success_with_deleted(deleted: u64) -> Self {
        Self {
            deleted: Some(deleted),
            ..Self::success()
        }
    }

    /// 에러 응답을 생성합니다.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(message.into()),
            deleted: None,
        }
    }
}
