//! 자연 키 기반 동기화
//!
//! 로컬 로그의 레코드를 원격 스토어로 올립니다. 중복 판정은
//! `(timestamp, command, user)` 자연 키로 합니다. 반복 호출은 로그가
//! 변하지 않는 한 0건 추가로 수렴하지만, 원자적이지는 않습니다 —
//! 중간에 중단되어도 다음 호출이 남은 레코드를 안전하게 마저 올립니다.

use metrics::counter;
use tracing::{info, warn};

use vigil_core::config::{StoreConfig, VigilConfig};
use vigil_core::metrics::{SYNC_EVENTS_ADDED_TOTAL, SYNC_EVENTS_SKIPPED_TOTAL};
use vigil_core::record::EventRecord;
use vigil_core::store::EventStore;
use vigil_store::StoreClient;

use crate::reader::LogReader;

/// 레코드 묶음을 스토어에 동기화하고 실제 추가된 건수를 반환합니다.
///
/// 레코드마다 자연 키로 `find`를 보내 이미 있으면 건너뛰고, 없으면
/// `insert`합니다. 개별 레코드의 실패는 로그만 남기고 건너뜁니다 —
/// 불량 레코드 하나가 배치 전체를 중단시키지 않습니다.
pub async fn sync_records(records: &[EventRecord], store: &mut impl EventStore) -> u64 {
    let mut added = 0u64;
    for record in records {
        let existing = match store.find(&record.natural_key_query()).await {
            Ok(existing) => existing,
            Err(err) => {
                counter!(SYNC_EVENTS_SKIPPED_TOTAL).increment(1);
                warn!(error = %err, record = %record, "duplicate check failed, skipping record");
                continue;
            }
        };
        if !existing.is_empty() {
            continue;
        }

        match store.insert(record).await {
            Ok(true) => {
                counter!(SYNC_EVENTS_ADDED_TOTAL).increment(1);
                added += 1;
            }
            Ok(false) => {
                counter!(SYNC_EVENTS_SKIPPED_TOTAL).increment(1);
                warn!(record = %record, "store declined insert, skipping record");
            }
            Err(err) => {
                counter!(SYNC_EVENTS_SKIPPED_TOTAL).increment(1);
                warn!(error = %err, record = %record, "insert failed, skipping record");
            }
        }
    }
    added
}

/// 로그 파일과 스토어를 잇는 동기화 진입점
#[derive(Debug, Clone)]
pub struct Synchronizer {
    reader: LogReader,
    store_config: StoreConfig,
}

impl Synchronizer {
    /// 로그 경로와 스토어 설정으로 동기화기를 생성합니다.
    pub fn new(log_file: impl Into<std::path::PathBuf>, store_config: StoreConfig) -> Self {
        Self {
            reader: LogReader::new(log_file),
            store_config,
        }
    }

    /// 전체 설정에서 동기화기를 구성합니다.
    pub fn from_config(config: &VigilConfig) -> Self {
        Self::new(config.events.log_file.clone(), config.store.clone())
    }

    /// 로그 전체를 한 번 동기화합니다.
    ///
    /// 로그가 비어 있으면 연결을 열지 않고 0을 반환합니다. 아니면
    /// 이 호출 범위로 한정된 연결 하나를 열어 배치를 처리합니다.
    pub async fn sync(&self) -> u64 {
        let records = self.reader.load().await;
        if records.is_empty() {
            return 0;
        }

        let mut client = StoreClient::new(self.store_config.clone());
        let added = sync_records(&records, &mut client).await;
        info!(
            total = records.len(),
            added, "event log synchronized to store"
        );
        added
    }
}
