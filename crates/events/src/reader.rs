//! JSON Lines 로그 리더
//!
//! 한 줄에 JSON 객체 하나인 로그 파일을 읽습니다. 시스템은 이벤트가
//! 하나도 기록되기 전부터 동작해야 하므로, 파일이 없으면 에러가 아닌
//! 빈 시퀀스를 돌려줍니다. 불량 바이트와 불량 라인은 건너뜁니다.

use std::path::{Path, PathBuf};

use metrics::counter;
use tracing::{debug, warn};

use vigil_core::metrics::READER_LINES_SKIPPED_TOTAL;
use vigil_core::record::EventRecord;

/// 이벤트 로그 파일 리더
#[derive(Debug, Clone)]
pub struct LogReader {
    path: PathBuf,
}

impl LogReader {
    /// 지정한 경로를 읽는 리더를 생성합니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 읽기 대상 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 로그 전체를 읽어 레코드 시퀀스로 반환합니다.
    ///
    /// 파일이 없거나 읽을 수 없으면 빈 시퀀스를 반환합니다. 잘못된
    /// UTF-8 바이트는 대체 문자로 치환하고, 빈 라인과 JSON 파싱에
    /// 실패한 라인은 건너뜁니다. 어떤 경우에도 실패하지 않습니다.
    pub async fn load(&self) -> Vec<EventRecord> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "event log does not exist yet");
                return Vec::new();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read event log");
                return Vec::new();
            }
        };

        let text = String::from_utf8_lossy(&raw);
        let mut events = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<EventRecord>(line) {
                Ok(record) => events.push(record),
                Err(err) => {
                    counter!(READER_LINES_SKIPPED_TOTAL).increment(1);
                    debug!(error = %err, "skipping unparsable log line");
                }
            }
        }
        events
    }
}
