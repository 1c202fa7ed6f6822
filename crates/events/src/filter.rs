//! 시간/텍스트 필터
//!
//! 대시보드 질의가 깨진 데이터 때문에 실패하지 않도록 모든 파싱은
//! 관대하게 동작합니다. 파싱할 수 없는 타임스탬프는 현재 시각으로
//! 앵커되어 필터와 정렬에 계속 참여합니다.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use regex::RegexBuilder;

use vigil_core::record::EventRecord;

/// 정식 프로파일 `YYYY-MM-DDTHH:MM:SS`
const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// 타임스탬프 문자열을 파싱합니다.
///
/// 1. 끝의 `Z` 또는 `+00:00`을 떼고 정식 프로파일로 엄격 파싱
/// 2. 실패 시 일반 ISO-8601 파싱 (오프셋, 소수점 초 허용)
/// 3. 그래도 실패하면 현재 시각을 반환 — 절대 실패하지 않습니다
pub fn parse_timestamp(ts: &str) -> NaiveDateTime {
    if ts.is_empty() {
        return Utc::now().naive_utc();
    }

    let stripped = ts
        .strip_suffix('Z')
        .or_else(|| ts.strip_suffix("+00:00"))
        .unwrap_or(ts);

    if let Ok(parsed) = NaiveDateTime::parse_from_str(stripped, CANONICAL_FORMAT) {
        return parsed;
    }

    // 'T' 구분자가 없으면 ISO-8601이 아니므로 바로 포기
    if !ts.contains('T') {
        return Utc::now().naive_utc();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(ts) {
        return parsed.naive_utc();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(stripped, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed;
    }

    Utc::now().naive_utc()
}

/// 레코드의 타임스탬프 필드를 파싱합니다.
pub fn record_timestamp(record: &EventRecord) -> NaiveDateTime {
    parse_timestamp(record.timestamp())
}

/// 최근 `hours`시간 창에 드는 레코드만 남깁니다.
///
/// `hours <= 0`이면 전체를 그대로 반환합니다. 시계 왜곡으로 방금
/// 수집된 레코드가 누락되지 않도록 미래 타임스탬프는 항상 포함합니다.
/// 입력 순서는 보존됩니다.
pub fn filter_by_recency(events: Vec<EventRecord>, hours: i64) -> Vec<EventRecord> {
    if hours <= 0 {
        return events;
    }

    let now = Utc::now().naive_utc();
    let cutoff = now - Duration::hours(hours);
    events
        .into_iter()
        .filter(|event| {
            let ts = record_timestamp(event);
            ts >= cutoff || ts > now
        })
        .collect()
}

/// 직렬화된 레코드 전문에 대해 대소문자 무시 검색을 수행합니다.
///
/// 패턴이 정규식으로 컴파일되면 정규식 매칭을, 컴파일에 실패하면
/// 평문 부분 문자열 매칭으로 폴백합니다. 사용자가 잘못된 정규식을
/// 입력해도 요청 자체는 실패하지 않습니다.
pub fn search(events: Vec<EventRecord>, pattern: &str) -> Vec<EventRecord> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => events
            .into_iter()
            .filter(|event| regex.is_match(&serialized_lower(event)))
            .collect(),
        Err(_) => {
            let needle = pattern.to_lowercase();
            events
                .into_iter()
                .filter(|event| serialized_lower(event).contains(&needle))
                .collect()
        }
    }
}

fn serialized_lower(record: &EventRecord) -> String {
    serde_json::to_string(record)
        .unwrap_or_default()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record_at(ts: &str) -> EventRecord {
        EventRecord::new().with("timestamp", ts)
    }

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_canonical_profile() {
        assert_eq!(
            parse_timestamp("2026-08-29T10:15:00"),
            naive(2026, 8, 29, 10, 15, 0)
        );
    }

    #[test]
    fn strips_trailing_zulu_and_offset() {
        let expected = naive(2026, 8, 29, 10, 15, 0);
        assert_eq!(parse_timestamp("2026-08-29T10:15:00Z"), expected);
        assert_eq!(parse_timestamp("2026-08-29T10:15:00+00:00"), expected);
    }

    #[test]
    fn falls_back_to_general_iso_parse() {
        let parsed = parse_timestamp("2026-08-29T10:15:00.123456Z");
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2026, 8, 29).unwrap());
        let offset = parse_timestamp("2026-08-29T10:15:00+09:00");
        assert_eq!(offset, naive(2026, 8, 29, 1, 15, 0));
    }

    #[test]
    fn never_fails_on_garbage_input() {
        let before = Utc::now().naive_utc();
        for input in ["", "not a time", "2026-08-29", "Tuesday", "T"] {
            let parsed = parse_timestamp(input);
            assert!(parsed >= before, "input {input:?} anchored before now");
        }
    }

    #[test]
    fn recency_zero_hours_is_identity() {
        let events = vec![
            record_at("1999-01-01T00:00:00"),
            record_at("2026-08-29T10:00:00"),
            record_at("garbage"),
        ];
        let kept = filter_by_recency(events.clone(), 0);
        assert_eq!(kept, events);
    }

    #[test]
    fn recency_drops_old_and_keeps_future() {
        let recent = Utc::now().naive_utc() - Duration::hours(1);
        let events = vec![
            record_at("1999-01-01T00:00:00"),
            record_at(&recent.format("%Y-%m-%dT%H:%M:%S").to_string()),
            record_at("2999-01-01T00:00:00"),
        ];
        let kept = filter_by_recency(events, 24);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].timestamp(), "2999-01-01T00:00:00");
    }

    #[test]
    fn recency_keeps_unparsable_timestamps() {
        let events = vec![record_at("definitely not a timestamp")];
        assert_eq!(filter_by_recency(events, 1).len(), 1);
    }

    #[test]
    fn recency_is_idempotent() {
        let recent = Utc::now().naive_utc() - Duration::hours(2);
        let events = vec![
            record_at("1999-01-01T00:00:00"),
            record_at(&recent.format("%Y-%m-%dT%H:%M:%S").to_string()),
        ];
        let once = filter_by_recency(events, 24);
        let twice = filter_by_recency(once.clone(), 24);
        assert_eq!(once, twice);
    }

    #[test]
    fn search_matches_case_insensitively() {
        let events = vec![
            EventRecord::new().with("user", "Alice"),
            EventRecord::new().with("user", "bob"),
        ];
        let found = search(events, "ALICE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user(), "Alice");
    }

    #[test]
    fn search_matches_any_field() {
        let events = vec![
            EventRecord::new()
                .with("user", "alice")
                .with("command", "/usr/bin/sudo su"),
        ];
        assert_eq!(search(events, "sudo").len(), 1);
    }

    #[test]
    fn invalid_regex_falls_back_to_substring() {
        let events = vec![
            EventRecord::new().with("command", "ls [backup]"),
            EventRecord::new().with("command", "ls backup"),
        ];
        // "["는 정규식으로 컴파일되지 않으므로 평문 매칭과 같아야 함
        let found = search(events.clone(), "[");
        let literal: Vec<_> = events
            .into_iter()
            .filter(|e| {
                serde_json::to_string(e)
                    .unwrap()
                    .to_lowercase()
                    .contains('[')
            })
            .collect();
        assert_eq!(found, literal);
        assert_eq!(found.len(), 1);
    }
}
