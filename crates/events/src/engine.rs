//! 질의/집계 엔진
//!
//! 대시보드의 목록/집계 연산을 구현합니다. 모든 연산은 로그에 대한
//! 순수한 뷰이며, 필드 누락이나 깨진 타임스탬프로 실패하지 않습니다.
//! 적용 순서는 항상 패싯 → 시간 창 → 검색 → 정렬입니다.

use chrono::NaiveDateTime;
use serde::Serialize;

use vigil_core::config::VigilConfig;
use vigil_core::record::{
    EventRecord, FIELD_EVENT_TYPE, FIELD_HOSTNAME, FIELD_SEVERITY, FIELD_USER, UNKNOWN,
};

use crate::filter::{filter_by_recency, record_timestamp, search};
use crate::source::EventSource;

/// 로그인 관련으로 분류되는 이벤트 타입
const LOGIN_EVENT_TYPES: [&str; 3] = ["user_login", "auth_failure", "authentication"];

/// 공통 질의 조건
///
/// 패싯 값이 빈 문자열이면 해당 패싯은 적용되지 않습니다. 패싯은
/// 원본 필드 값과 정확히 일치해야 하며, 필드가 없는 레코드는 어떤
/// 비어 있지 않은 패싯과도 일치하지 않습니다.
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// 이벤트 타입 패싯
    pub event_type: String,
    /// 심각도 패싯
    pub severity: String,
    /// 호스트명 패싯
    pub hostname: String,
    /// 사용자 패싯
    pub user: String,
    /// 시간 창 (시간 단위, 0 이하면 전체)
    pub hours: i64,
    /// 검색 패턴 (빈 문자열이면 검색 없음)
    pub search: String,
    /// 실시간 모드 — 로컬 로그만 읽고 스토어 폴백 없음
    pub realtime: bool,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            event_type: String::new(),
            severity: String::new(),
            hostname: String::new(),
            user: String::new(),
            hours: 24,
            search: String::new(),
            realtime: false,
        }
    }
}

impl EventFilter {
    fn apply(&self, mut events: Vec<EventRecord>) -> Vec<EventRecord> {
        for (field, value) in [
            (FIELD_EVENT_TYPE, &self.event_type),
            (FIELD_SEVERITY, &self.severity),
            (FIELD_HOSTNAME, &self.hostname),
            (FIELD_USER, &self.user),
        ] {
            if !value.is_empty() {
                events.retain(|e| e.get_str(field) == Some(value.as_str()));
            }
        }

        events = filter_by_recency(events, self.hours);

        if !self.search.is_empty() {
            events = search(events, &self.search);
        }
        events
    }
}

/// 페이지 단위 목록 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPage {
    /// 이 페이지의 이벤트
    pub events: Vec<EventRecord>,
    /// 필터 적용 후 전체 건수
    pub total: usize,
    /// 요청된 페이지 (1부터)
    pub page: usize,
    /// 페이지 크기
    pub per_page: usize,
    /// 전체 페이지 수
    pub pages: usize,
}

/// 호스트별 활동 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentActivity {
    /// 호스트명 (`unknown` 포함)
    pub hostname: String,
    /// 가장 최근 이벤트의 원본 타임스탬프 문자열
    pub last_activity: String,
    /// 이벤트 건수
    pub event_count: u64,
}

/// 키별 건수
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountEntry {
    /// 집계 키 (사용자, 프로세스, 타입, 심각도, 호스트명)
    pub key: String,
    /// 건수
    pub count: u64,
}

/// 로그인 이벤트 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginEntry {
    /// 원본 타임스탬프 문자열
    pub timestamp: String,
    /// 사용자 (기본 `unknown`)
    pub user: String,
    /// 호스트명 (기본 `unknown`)
    pub hostname: String,
    /// `user_login`이면 `success`, 아니면 `failure`
    pub status: String,
    /// 원본 이벤트 타입
    pub event_type: String,
    /// 심각도 (기본 `low`)
    pub severity: String,
}

/// 시간대별 이벤트 건수
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineBucket {
    /// `YYYY-MM-DD HH:00` 형식의 시간대 키
    pub hour: String,
    /// 건수
    pub count: u64,
}

/// 타임스탬프 내림차순 정렬 (최신 우선)
///
/// 키는 원소당 한 번만 파싱합니다. 정렬은 안정적이므로 같은
/// 타임스탬프끼리는 입력 순서를 유지합니다.
pub fn sort_by_timestamp_desc(events: &mut Vec<EventRecord>) {
    let mut keyed: Vec<(NaiveDateTime, EventRecord)> = std::mem::take(events)
        .into_iter()
        .map(|e| (record_timestamp(&e), e))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    *events = keyed.into_iter().map(|(_, e)| e).collect();
}

/// 1부터 시작하는 페이지로 자릅니다.
///
/// 범위를 벗어난 페이지는 실패가 아닌 빈 페이지입니다.
/// `per_page`는 최소 1로 보정됩니다.
pub fn paginate(events: Vec<EventRecord>, page: usize, per_page: usize) -> EventPage {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = events.len();
    let start = (page - 1).saturating_mul(per_page);
    let slice = if start >= total {
        Vec::new()
    } else {
        let end = (start + per_page).min(total);
        events[start..end].to_vec()
    };
    EventPage {
        events: slice,
        total,
        page,
        per_page,
        pages: total.div_ceil(per_page),
    }
}

/// 호스트별 활동 집계 — 등장 순서 유지
pub fn active_agents(events: &[EventRecord]) -> Vec<AgentActivity> {
    let mut agents: Vec<AgentActivity> = Vec::new();
    for event in events {
        let hostname = event.hostname();
        let idx = match agents.iter().position(|a| a.hostname == hostname) {
            Some(idx) => idx,
            None => {
                agents.push(AgentActivity {
                    hostname: hostname.to_owned(),
                    last_activity: event.timestamp().to_owned(),
                    event_count: 0,
                });
                agents.len() - 1
            }
        };
        agents[idx].event_count += 1;
        if record_timestamp(event) > crate::filter::parse_timestamp(&agents[idx].last_activity) {
            agents[idx].last_activity = event.timestamp().to_owned();
        }
    }
    agents
}

/// 호스트별 건수 집계 — 등장 순서 유지
pub fn host_counts(events: &[EventRecord]) -> Vec<CountEntry> {
    count_by(events, |e| Some(e.hostname().to_owned()))
}

/// 로그인 관련 이벤트 최신순 `limit`건
pub fn recent_logins(events: Vec<EventRecord>, limit: usize) -> Vec<LoginEntry> {
    let mut logins: Vec<EventRecord> = events
        .into_iter()
        .filter(|e| LOGIN_EVENT_TYPES.contains(&e.event_type()))
        .collect();
    sort_by_timestamp_desc(&mut logins);
    logins.truncate(limit);

    logins
        .into_iter()
        .map(|e| LoginEntry {
            timestamp: e.timestamp().to_owned(),
            user: e.user().to_owned(),
            hostname: e.hostname().to_owned(),
            status: if e.event_type() == "user_login" {
                "success".to_owned()
            } else {
                "failure".to_owned()
            },
            event_type: e.event_type().to_owned(),
            severity: e.severity().to_owned(),
        })
        .collect()
}

/// 사용자별 상위 `limit`명 — `unknown`과 빈 값은 집계에서 제외
pub fn top_users(events: &[EventRecord], limit: usize) -> Vec<CountEntry> {
    top_by(events, limit, EventRecord::user)
}

/// 프로세스별 상위 `limit`개 — `unknown`과 빈 값은 집계에서 제외
pub fn top_processes(events: &[EventRecord], limit: usize) -> Vec<CountEntry> {
    top_by(events, limit, EventRecord::process)
}

fn top_by(
    events: &[EventRecord],
    limit: usize,
    field: impl Fn(&EventRecord) -> &str,
) -> Vec<CountEntry> {
    let mut counts = count_by(events, |e| {
        let value = field(e);
        (!value.is_empty() && value != UNKNOWN).then(|| value.to_owned())
    });
    // 안정 정렬 — 동률은 등장 순서 유지
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// 타입별 건수 — 건수 내림차순, 기본값 `unknown` 버킷 포함
pub fn count_by_type(events: &[EventRecord]) -> Vec<CountEntry> {
    let mut counts = count_by(events, |e| Some(e.event_type().to_owned()));
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// 심각도별 건수 — 등장 순서 유지, 기본값 `low` 버킷 포함
pub fn count_by_severity(events: &[EventRecord]) -> Vec<CountEntry> {
    count_by(events, |e| Some(e.severity().to_owned()))
}

/// 시간대별 건수 — 시간대 키 오름차순 (시간순)
pub fn timeline(events: &[EventRecord]) -> Vec<TimelineBucket> {
    let mut buckets = count_by(events, |e| {
        Some(record_timestamp(e).format("%Y-%m-%d %H:00").to_string())
    });
    buckets.sort_by(|a, b| a.key.cmp(&b.key));
    buckets
        .into_iter()
        .map(|c| TimelineBucket {
            hour: c.key,
            count: c.count,
        })
        .collect()
}

/// 등장 순서를 유지하는 키별 건수 집계
fn count_by(
    events: &[EventRecord],
    key: impl Fn(&EventRecord) -> Option<String>,
) -> Vec<CountEntry> {
    let mut counts: Vec<CountEntry> = Vec::new();
    for event in events {
        let Some(key) = key(event) else { continue };
        match counts.iter().position(|c| c.key == key) {
            Some(idx) => counts[idx].count += 1,
            None => counts.push(CountEntry { key, count: 1 }),
        }
    }
    counts
}

/// 대시보드 질의 엔진
///
/// 연산마다 이벤트 소스를 새로 읽습니다. 읽기는 상태를 공유하지
/// 않으므로 여러 호출자가 동시에 읽어도 안전합니다.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    source: EventSource,
}

impl QueryEngine {
    /// 이벤트 소스로 엔진을 생성합니다.
    pub fn new(source: EventSource) -> Self {
        Self { source }
    }

    /// 전체 설정에서 엔진을 구성합니다.
    pub fn from_config(config: &VigilConfig) -> Self {
        Self::new(EventSource::from_config(config))
    }

    async fn filtered(&self, filter: &EventFilter) -> Vec<EventRecord> {
        filter.apply(self.source.load(filter.realtime).await)
    }

    async fn windowed(&self, hours: i64, realtime: bool) -> Vec<EventRecord> {
        filter_by_recency(self.source.load(realtime).await, hours)
    }

    /// 필터링된 이벤트를 최신순으로 정렬해 페이지 단위로 반환합니다.
    pub async fn list(&self, filter: &EventFilter, page: usize, per_page: usize) -> EventPage {
        let mut events = self.filtered(filter).await;
        sort_by_timestamp_desc(&mut events);
        paginate(events, page, per_page)
    }

    /// 식별자로 단건 조회합니다. 없음은 에러가 아닌 `None`입니다.
    pub async fn find_by_id(&self, id: &str) -> Option<EventRecord> {
        self.source
            .load(false)
            .await
            .into_iter()
            .find(|e| e.id() == Some(id))
    }

    /// 시간 창 내 호스트별 활동 요약
    pub async fn active_agents(&self, hours: i64, realtime: bool) -> Vec<AgentActivity> {
        active_agents(&self.windowed(hours, realtime).await)
    }

    /// 시간 창 내 호스트별 건수
    pub async fn host_counts(&self, hours: i64, realtime: bool) -> Vec<CountEntry> {
        host_counts(&self.windowed(hours, realtime).await)
    }

    /// 로그인 관련 이벤트 최신순 `limit`건 (시간 창 없음)
    pub async fn recent_logins(&self, limit: usize, realtime: bool) -> Vec<LoginEntry> {
        recent_logins(self.source.load(realtime).await, limit)
    }

    /// 시간 창 내 사용자별 상위 `limit`명
    pub async fn top_users(&self, hours: i64, limit: usize, realtime: bool) -> Vec<CountEntry> {
        top_users(&self.windowed(hours, realtime).await, limit)
    }

    /// 시간 창 내 프로세스별 상위 `limit`개
    pub async fn top_processes(&self, hours: i64, limit: usize, realtime: bool) -> Vec<CountEntry> {
        top_processes(&self.windowed(hours, realtime).await, limit)
    }

    /// 시간 창 내 타입별 건수
    pub async fn count_by_type(&self, hours: i64, realtime: bool) -> Vec<CountEntry> {
        count_by_type(&self.windowed(hours, realtime).await)
    }

    /// 시간 창 내 심각도별 건수
    pub async fn count_by_severity(&self, hours: i64, realtime: bool) -> Vec<CountEntry> {
        count_by_severity(&self.windowed(hours, realtime).await)
    }

    /// 시간 창 내 시간대별 건수
    pub async fn timeline(&self, hours: i64, realtime: bool) -> Vec<TimelineBucket> {
        timeline(&self.windowed(hours, realtime).await)
    }
}
