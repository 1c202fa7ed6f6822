//! 이벤트 내보내기
//!
//! 병합된 전체 소스(로그 우선, 스토어 폴백)를 시간 창으로 거르고
//! 최신순으로 정렬해 CSV 또는 JSON 문서로 직렬화합니다. 실시간
//! 모드는 내보내기에 적용되지 않습니다.

use serde_json::Value;

use vigil_core::record::EventRecord;

use crate::engine::sort_by_timestamp_desc;
use crate::error::EventsError;
use crate::filter::filter_by_recency;
use crate::source::EventSource;

/// 내보내기 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// 헤더 + 행 형태의 표 형식
    Csv,
    /// 들여쓰기된 JSON 배열
    Json,
}

impl ExportFormat {
    /// 형식 이름을 해석합니다. `csv`가 아니면 모두 JSON입니다.
    pub fn from_name(name: &str) -> Self {
        if name == "csv" { Self::Csv } else { Self::Json }
    }
}

/// 직렬화된 내보내기 결과
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    /// 직렬화된 본문
    pub body: String,
    /// MIME 타입
    pub mime: &'static str,
    /// 다운로드 파일명 제안
    pub filename: &'static str,
}

/// 소스를 읽어 시간 창 필터와 최신순 정렬을 적용한 뒤 직렬화합니다.
pub async fn export_events(
    source: &EventSource,
    hours: i64,
    format: ExportFormat,
) -> Result<ExportPayload, EventsError> {
    let mut events = filter_by_recency(source.load(false).await, hours);
    sort_by_timestamp_desc(&mut events);
    render(&events, format)
}

/// 레코드 시퀀스를 주어진 형식으로 직렬화합니다.
///
/// CSV 헤더는 첫 레코드의 키 집합입니다. 헤더에 없는 키는 무시되고,
/// 레코드에 없는 키는 빈 칸으로 채워집니다. 빈 시퀀스의 CSV는
/// 헤더조차 없는 빈 본문입니다.
pub fn render(events: &[EventRecord], format: ExportFormat) -> Result<ExportPayload, EventsError> {
    match format {
        ExportFormat::Csv => Ok(ExportPayload {
            body: render_csv(events)?,
            mime: "text/csv",
            filename: "events.csv",
        }),
        ExportFormat::Json => Ok(ExportPayload {
            body: serde_json::to_string_pretty(events)?,
            mime: "application/json",
            filename: "events.json",
        }),
    }
}

fn render_csv(events: &[EventRecord]) -> Result<String, EventsError> {
    let Some(first) = events.first() else {
        return Ok(String::new());
    };

    let headers: Vec<&str> = first.fields().keys().map(String::as_str).collect();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for event in events {
        let row: Vec<String> = headers
            .iter()
            .map(|key| match event.fields().get(*key) {
                Some(Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => String::new(),
            })
            .collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
