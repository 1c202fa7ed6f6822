//! 스토어 trait — 원격 저장소 연산의 확장 포인트
//!
//! 동기화기와 쿼리 폴백 경로는 이 trait을 통해서만 원격 스토어에
//! 접근합니다. 테스트에서는 인메모리 구현으로 실제 전송 계층을
//! 대체할 수 있습니다.

use crate::error::StoreError;
use crate::record::{EventRecord, Fields};

/// 원격 이벤트 스토어 연산
///
/// 모든 연산은 하나의 연결 위에서 엄격한 요청/응답 교대로 수행되므로
/// `&mut self`를 받습니다. 연결 수명은 구현체가 소유합니다.
#[allow(async_fn_in_trait)]
pub trait EventStore {
    /// 쿼리에 일치하는 레코드를 조회합니다. 일치 없음은 빈 시퀀스입니다.
    async fn find(&mut self, query: &Fields) -> Result<Vec<EventRecord>, StoreError>;

    /// 레코드를 삽입합니다. 스토어가 수락했는지 여부를 반환합니다.
    async fn insert(&mut self, record: &EventRecord) -> Result<bool, StoreError>;

    /// 쿼리에 일치하는 레코드를 삭제하고 삭제된 개수를 반환합니다.
    async fn delete(&mut self, query: &Fields) -> Result<u64, StoreError>;
}
