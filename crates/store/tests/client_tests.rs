//! 스토어 클라이언트 통합 테스트
//!
//! 인프로세스 TCP 목 스토어를 띄워 프레이밍, 요청/응답 해석,
//! 1회 재연결-재시도 정책을 검증합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use vigil_core::config::StoreConfig;
use vigil_core::error::StoreError;
use vigil_core::record::{EventRecord, Fields};
use vigil_store::{Request, Response, StoreClient, read_frame, write_frame};

fn config_for(port: u16) -> StoreConfig {
    StoreConfig {
        host: "127.0.0.1".to_owned(),
        port,
        ..StoreConfig::default()
    }
}

/// 연결 하나를 수락해 요청마다 준비된 응답을 돌려주는 목 스토어
async fn serve_responses(
    listener: TcpListener,
    responses: Vec<Response>,
    requests_seen: Arc<AtomicUsize>,
) {
    let (mut stream, _) = listener.accept().await.unwrap();
    for response in responses {
        let _request: Request = read_frame(&mut stream).await.unwrap();
        requests_seen.fetch_add(1, Ordering::SeqCst);
        write_frame(&mut stream, &response).await.unwrap();
    }
}

#[tokio::test]
async fn find_returns_records_on_success() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(AtomicUsize::new(0));

    let record = EventRecord::new()
        .with("event_type", "user_login")
        .with("hostname", "web-01");
    let server = tokio::spawn(serve_responses(
        listener,
        vec![Response::success_with_data(vec![record.clone()])],
        Arc::clone(&seen),
    ));

    let mut client = StoreClient::new(config_for(port));
    let found = client.find(&Fields::new()).await.unwrap();
    assert_eq!(found, vec![record]);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    server.await.unwrap();
}

#[tokio::test]
async fn find_with_absent_data_is_empty() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(AtomicUsize::new(0));

    let server = tokio::spawn(serve_responses(
        listener,
        vec![Response::success()],
        Arc::clone(&seen),
    ));

    let mut client = StoreClient::new(config_for(port));
    let found = client.find(&Fields::new()).await.unwrap();
    assert!(found.is_empty());
    server.await.unwrap();
}

#[tokio::test]
async fn error_response_is_rejected_and_not_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(AtomicUsize::new(0));

    let server = tokio::spawn(serve_responses(
        listener,
        vec![Response::error("unknown collection")],
        Arc::clone(&seen),
    ));

    let mut client = StoreClient::new(config_for(port));
    let err = client.find(&Fields::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::Rejected(_)));
    assert!(err.to_string().contains("unknown collection"));
    // 정상 형식의 에러 응답은 재전송 대상이 아님
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    server.await.unwrap();
}

#[tokio::test]
async fn insert_reports_store_acceptance() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(AtomicUsize::new(0));

    let server = tokio::spawn(serve_responses(
        listener,
        vec![Response::success(), Response::error("duplicate")],
        Arc::clone(&seen),
    ));

    let mut client = StoreClient::new(config_for(port));
    let record = EventRecord::new().with("event_type", "process_start");
    assert!(client.insert(&record).await.unwrap());
    assert!(!client.insert(&record).await.unwrap());
    server.await.unwrap();
}

#[tokio::test]
async fn delete_returns_deleted_count() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(AtomicUsize::new(0));

    let server = tokio::spawn(serve_responses(
        listener,
        vec![Response::success_with_deleted(7)],
        Arc::clone(&seen),
    ));

    let mut client = StoreClient::new(config_for(port));
    assert_eq!(client.delete(&Fields::new()).await.unwrap(), 7);
    server.await.unwrap();
}

#[tokio::test]
async fn strict_alternation_on_one_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(AtomicUsize::new(0));

    let server = tokio::spawn(serve_responses(
        listener,
        vec![
            Response::success_with_data(vec![]),
            Response::success(),
            Response::success_with_deleted(1),
        ],
        Arc::clone(&seen),
    ));

    // 세 연산 모두 같은 연결 위에서 순차 수행됩니다.
    let mut client = StoreClient::new(config_for(port));
    client.find(&Fields::new()).await.unwrap();
    client
        .insert(&EventRecord::new().with("event_type", "file_access"))
        .await
        .unwrap();
    client.delete(&Fields::new()).await.unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 3);
    server.await.unwrap();
}

#[tokio::test]
async fn reconnects_and_resends_after_dropped_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_server = Arc::clone(&seen);

    let record = EventRecord::new().with("event_type", "user_login");
    let response = Response::success_with_data(vec![record.clone()]);
    let server = tokio::spawn(async move {
        // 첫 연결: 요청을 읽고 응답 없이 연결을 끊음
        let (mut first, _) = listener.accept().await.unwrap();
        let _request: Request = read_frame(&mut first).await.unwrap();
        seen_server.fetch_add(1, Ordering::SeqCst);
        drop(first);

        // 두 번째 연결: 재전송된 요청에 정상 응답
        let (mut second, _) = listener.accept().await.unwrap();
        let _request: Request = read_frame(&mut second).await.unwrap();
        seen_server.fetch_add(1, Ordering::SeqCst);
        write_frame(&mut second, &response).await.unwrap();
    });

    let mut client = StoreClient::new(config_for(port));
    // 재전송 결과가 에러 없이 호출자에게 반환되어야 함
    let found = client.find(&Fields::new()).await.unwrap();
    assert_eq!(found, vec![record]);
    assert_eq!(seen.load(Ordering::SeqCst), 2);
    server.await.unwrap();
}

#[tokio::test]
async fn failed_reconnect_surfaces_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        // 요청을 읽고 응답 없이 연결을 끊은 뒤 리스너도 닫음
        let (mut stream, _) = listener.accept().await.unwrap();
        let _request: Request = read_frame(&mut stream).await.unwrap();
        drop(stream);
        drop(listener);
    });

    // 첫 전송은 성공하지만 응답 전에 끊기고, 재연결은 거부됨
    let mut client = StoreClient::new(config_for(port));
    let err = client.find(&Fields::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::Connection { .. }));
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_payload_is_not_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_server = Arc::clone(&seen);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _request: Request = read_frame(&mut stream).await.unwrap();
        seen_server.fetch_add(1, Ordering::SeqCst);

        // 길이는 올바르지만 JSON이 아닌 페이로드
        let payload = b"this is not json";
        stream
            .write_all(&(payload.len() as u32).to_be_bytes())
            .await
            .unwrap();
        stream.write_all(payload).await.unwrap();
        stream.flush().await.unwrap();

        // 클라이언트가 재전송하면 여기서 또 읽혔을 것
        let second: Result<Request, _> = read_frame(&mut stream).await;
        assert!(second.is_err());
    });

    let mut client = StoreClient::new(config_for(port));
    let err = client.find(&Fields::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::MalformedPayload(_)));
    drop(client);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    server.await.unwrap();
}
