//! 이벤트 소스 선택
//!
//! 모든 읽기 경로의 진입점입니다. 로컬 로그를 우선 읽고, 로그가
//! 비어 있을 때만 원격 스토어로 폴백합니다. 실시간 모드는 현재
//! 디스크 상태를 그대로 비춰야 하므로 폴백하지 않습니다.

use std::path::PathBuf;

use tracing::warn;

use vigil_core::config::{StoreConfig, VigilConfig};
use vigil_core::record::{EventRecord, Fields};
use vigil_core::store::EventStore;
use vigil_store::StoreClient;

use crate::reader::LogReader;

/// 로그 우선, 스토어 폴백 이벤트 소스
#[derive(Debug, Clone)]
pub struct EventSource {
    reader: LogReader,
    store_config: StoreConfig,
}

impl EventSource {
    /// 로그 경로와 스토어 설정으로 소스를 생성합니다.
    pub fn new(log_file: impl Into<PathBuf>, store_config: StoreConfig) -> Self {
        Self {
            reader: LogReader::new(log_file),
            store_config,
        }
    }

    /// 전체 설정에서 소스를 구성합니다.
    pub fn from_config(config: &VigilConfig) -> Self {
        Self::new(config.events.log_file.clone(), config.store.clone())
    }

    /// 이벤트를 읽어옵니다.
    ///
    /// `realtime`이면 로컬 로그만 읽습니다. 아니면 로컬 로그를 읽되,
    /// 로그가 비어 있을 때에 한해 원격 스토어에 빈 필터 `find`를
    /// 보내 폴백합니다. 스토어 장애는 빈 시퀀스로 강등됩니다.
    pub async fn load(&self, realtime: bool) -> Vec<EventRecord> {
        if realtime {
            return self.reader.load().await;
        }
        let mut client = StoreClient::new(self.store_config.clone());
        load_with_fallback(&self.reader, &mut client).await
    }
}

/// 로그 우선 읽기의 폴백 로직
///
/// 스토어 접근을 [`EventStore`]로 추상화하여 테스트에서 실제 전송
/// 없이 폴백 경로를 검증할 수 있습니다.
pub async fn load_with_fallback(
    reader: &LogReader,
    store: &mut impl EventStore,
) -> Vec<EventRecord> {
    let local = reader.load().await;
    if !local.is_empty() {
        return local;
    }

    match store.find(&Fields::new()).await {
        Ok(remote) => remote,
        Err(err) => {
            warn!(error = %err, "store fallback failed, degrading to empty view");
            Vec::new()
        }
    }
}
