//! 스토어 클라이언트 — 단일 TCP 연결 소유 및 재시도 정책
//!
//! [`StoreClient`]는 원격 스토어로의 TCP 연결 하나를 독점 소유합니다.
//! 모든 연산은 응답 프레임이 완전히 디코딩되거나 최종 실패가 확정될
//! 때까지 대기하며, 한 연결에서 동시 요청은 허용되지 않습니다.
//!
//! # 재시도 정책 (정확히 1회)
//!
//! ```text
//! Connected --(전송 장애)--> Reconnecting --(성공)--> Connected [1회 재전송]
//!                                        --(실패)--> Failed [ConnectionError]
//! ```
//!
//! 전송 계층 장애(`Framing`, I/O)에서만 재연결-재전송을 수행합니다.
//! `MalformedPayload`와 `Rejected`는 재전송해도 결과가 달라지지 않으므로
//! 즉시 전파합니다. 추가 재시도는 상위 레이어의 몫입니다.

use metrics::counter;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use vigil_core::config::StoreConfig;
use vigil_core::error::StoreError;
use vigil_core::metrics::{LABEL_OPERATION, LABEL_RESULT, STORE_RECONNECTS_TOTAL, STORE_REQUESTS_TOTAL};
use vigil_core::record::{EventRecord, Fields};
use vigil_core::store::EventStore;

use crate::codec::{read_frame, write_frame};
use crate::protocol::{Request, Response, Status};

/// 원격 스토어 클라이언트
///
/// 연결은 첫 연산 시 또는 명시적 [`connect`](Self::connect)로 생성되고,
/// 값이 스코프를 벗어나면 닫힙니다 (`TcpStream`의 Drop). 복구 불가능한
/// I/O 에러 시에는 연산당 최대 1회 재생성됩니다.
pub struct StoreClient {
    /// 스토어 주소 및 기본 database/collection
    config: StoreConfig,
    /// 현재 연결. `None`이면 끊긴 상태.
    stream: Option<TcpStream>,
}

impl StoreClient {
    /// 연결하지 않은 클라이언트를 생성합니다.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// 연결된 클라이언트를 생성합니다 (스코프 사용 형태).
    ///
    /// 진입 시 연결하고, 값이 드롭되면 모든 경로에서 연결이 해제됩니다.
    pub async fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let mut client = Self::new(config);
        client.ensure_connected().await?;
        Ok(client)
    }

    /// TCP 연결을 엽니다. 성공 여부를 반환합니다.
    ///
    /// 일반적인 연결 실패(호스트 도달 불가, 거부)는 에러가 아니라
    /// `false`입니다. 호출자가 불리언을 검사합니다.
    pub async fn connect(&mut self) -> bool {
        let addr = self.config.addr();
        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                debug!(addr = %addr, "connected to event store");
                self.stream = Some(stream);
                true
            }
            Err(e) => {
                warn!(addr = %addr, error = %e, "failed to connect to event store");
                false
            }
        }
    }

    /// 연결을 닫습니다. 이미 닫힌 상태에서도 안전합니다.
    pub fn disconnect(&mut self) {
        self.stream = None;
    }

    /// 현재 연결 여부를 반환합니다.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// 연결이 없으면 필요 시 새로 엽니다.
    async fn ensure_connected(&mut self) -> Result<(), StoreError> {
        if self.stream.is_none() && !self.connect().await {
            return Err(StoreError::Connection {
                addr: self.config.addr(),
                reason: "cannot open connection".to_owned(),
            });
        }
        Ok(())
    }

    /// 요청 하나를 보내고 응답 하나를 기다립니다.
    async fn round_trip(&mut self, request: &Request) -> Result<Response, StoreError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(StoreError::Connection {
                addr: self.config.addr(),
                reason: "not connected".to_owned(),
            });
        };
        write_frame(stream, request).await?;
        read_frame(stream).await
    }

    /// 요청을 실행합니다. 전송 장애 시 1회 재연결-재전송합니다.
    async fn execute(&mut self, request: &Request) -> Result<Response, StoreError> {
        self.ensure_connected().await?;
        counter!(STORE_REQUESTS_TOTAL, LABEL_OPERATION => request.operation.name()).increment(1);

        match self.round_trip(request).await {
            Err(e) if e.is_transport() => {
                warn!(
                    operation = request.operation.name(),
                    error = %e,
                    "transport failure, reconnecting once"
                );
                self.disconnect();
                if !self.connect().await {
                    counter!(STORE_RECONNECTS_TOTAL, LABEL_RESULT => "failure").increment(1);
                    return Err(StoreError::Connection {
                        addr: self.config.addr(),
                        reason: format!("connection lost and cannot reconnect: {e}"),
                    });
                }
                counter!(STORE_RECONNECTS_TOTAL, LABEL_RESULT => "success").increment(1);

                // 동일한 요청을 정확히 1회 재전송. 또 실패하면 그대로 확정.
                self.round_trip(request).await.map_err(|retry_err| {
                    if retry_err.is_transport() {
                        StoreError::Connection {
                            addr: self.config.addr(),
                            reason: format!("retried request failed: {retry_err}"),
                        }
                    } else {
                        retry_err
                    }
                })
            }
            other => other,
        }
    }

    /// `find` 요청을 보내고 결과 레코드를 반환합니다.
    ///
    /// 성공 응답에 `data`가 없으면 빈 시퀀스입니다. 에러 응답은
    /// [`StoreError::Rejected`]로 전파됩니다.
    pub async fn find(&mut self, query: &Fields) -> Result<Vec<EventRecord>, StoreError> {
        let request = Request::find(
            self.config.database.clone(),
            self.config.collection.clone(),
            query.clone(),
        );
        let response = self.execute(&request).await?;
        match response.status {
            Status::Success => Ok(response.data.unwrap_or_default()),
            Status::Error => Err(StoreError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "unknown error".to_owned()),
            )),
        }
    }

    /// `insert` 요청을 보내고 스토어의 수락 여부를 반환합니다.
    pub async fn insert(&mut self, record: &EventRecord) -> Result<bool, StoreError> {
        let request = Request::insert(
            self.config.database.clone(),
            self.config.collection.clone(),
            record.clone(),
        );
        let response = self.execute(&request).await?;
        Ok(response.status == Status::Success)
    }

    /// `delete` 요청을 보내고 삭제된 레코드 수를 반환합니다.
    pub async fn delete(&mut self, query: &Fields) -> Result<u64, StoreError> {
        let request = Request::delete(
            self.config.database.clone(),
            self.config.collection.clone(),
            query.clone(),
        );
        let response = self.execute(&request).await?;
        match response.status {
            Status::Success => Ok(response.deleted.unwrap_or(0)),
            Status::Error => Err(StoreError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "unknown error".to_owned()),
            )),
        }
    }
}

impl EventStore for StoreClient {
    async fn find(&mut self, query: &Fields) -> Result<Vec<EventRecord>, StoreError> {
        StoreClient::find(self, query).await
    }

    async fn insert(&mut self, record: &EventRecord) -> Result<bool, StoreError> {
        StoreClient::insert(self, record).await
    }

    async fn delete(&mut self, query: &Fields) -> Result<u64, StoreError> {
        StoreClient::delete(self, query).await
    }
}
