//! 제안 파이프라인 통합 테스트.
//!
//! REST 어댑터 + 서비스 + 미러 + 변경 피드 cross-crate 연동.

use async_trait::async_trait;
use mockito::{Matcher, Mock, ServerGuard};
use parking_lot::Mutex;
use replyhub_core::config::{FeedbackConfig, GeneratorConfig};
use replyhub_core::error::CoreError;
use replyhub_core::models::change::ChangeEvent;
use replyhub_core::models::feedback::FeedbackReason;
use replyhub_core::models::suggestion::{Suggestion, SuggestionStatus};
use replyhub_core::ports::change_feed::ChangeFeed;
use replyhub_core::ports::observability::TraceCollector;
use replyhub_network::auth::StaticIdentity;
use replyhub_network::generator_client::HttpSuggestionGenerator;
use replyhub_network::http_client::RestClient;
use replyhub_network::repository::RestSuggestionRepository;
use replyhub_network::trace_client::{HttpTraceCollector, NoOpTraceCollector};
use replyhub_suggestion::service::{SuggestionPorts, SuggestionService};
use replyhub_suggestion::subscription::SubscriptionManager;
use replyhub_suggestion::view::{LiveView, ViewStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const TICKET: &str = "tkt_1";

fn row(id: &str, second: u32) -> String {
    format!(
        r#"{{"id":"{id}","ticket_id":"{TICKET}","suggested_response":"답변 {id}","status":"pending","metadata":{{"model":"gpt-4o","token_usage":{{"total_tokens":120}}}},"created_at":"2026-03-01T10:00:{second:02}Z","updated_at":"2026-03-01T10:00:{second:02}Z"}}"#
    )
}

fn suggestion(id: &str, second: u32) -> Suggestion {
    serde_json::from_str(&row(id, second)).unwrap()
}

fn ports(server: &ServerGuard, tracer: Arc<dyn TraceCollector>) -> SuggestionPorts {
    let client = RestClient::new(&server.url(), Some("anon".to_string()), Duration::from_secs(5))
        .unwrap();
    let repository = Arc::new(RestSuggestionRepository::new(client.clone()));
    SuggestionPorts {
        suggestions: repository.clone(),
        tickets: repository,
        generator: Arc::new(HttpSuggestionGenerator::new(
            client,
            &GeneratorConfig::default(),
        )),
        identity: Arc::new(StaticIdentity::new(Some("agent_1".to_string()))),
        tracer,
    }
}

/// 티켓 조회 + 단건 조회 + 티켓 컨텍스트 목
async fn mock_reads(server: &mut ServerGuard) -> Vec<Mock> {
    vec![
        server
            .mock("GET", "/rest/v1/ai_suggestions")
            .match_query(Matcher::UrlEncoded("ticket_id".into(), format!("eq.{TICKET}")))
            .with_status(200)
            .with_body(format!("[{},{}]", row("s1", 0), row("s2", 1)))
            .create_async()
            .await,
        server
            .mock("GET", "/rest/v1/ai_suggestions")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.s1".into()))
            .with_status(200)
            .with_body(format!("[{}]", row("s1", 0)))
            .create_async()
            .await,
        server
            .mock("GET", "/rest/v1/tickets")
            .match_query(Matcher::UrlEncoded("id".into(), format!("eq.{TICKET}")))
            .with_status(200)
            .with_body(r#"[{"id":"tkt_1","subject":"배송 문의","status":"open","created_at":"2026-03-01T09:00:00Z"}]"#)
            .create_async()
            .await,
        server
            .mock("GET", "/rest/v1/ticket_messages")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"id":"m1","content":"언제 오나요?","author_type":"customer","created_at":"2026-03-01T09:30:00Z"}]"#)
            .create_async()
            .await,
    ]
}

fn service(server: &ServerGuard, tracer: Arc<dyn TraceCollector>) -> SuggestionService {
    SuggestionService::new(TICKET, ports(server, tracer), &FeedbackConfig::default())
}

/// 조건을 만족하는 뷰가 나올 때까지 대기
async fn wait_for(
    rx: &mut watch::Receiver<LiveView>,
    pred: impl Fn(&LiveView) -> bool,
) -> LiveView {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let view = rx.borrow_and_update();
                if pred(&view) {
                    return view.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("뷰 대기 시간 초과")
}

#[tokio::test]
async fn fetch_then_accept_over_rest() {
    let mut server = mockito::Server::new_async().await;
    let _reads = mock_reads(&mut server).await;
    let patch = server
        .mock("PATCH", "/rest/v1/ai_suggestions")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.s1".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({"status": "accepted"})))
        .with_status(204)
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/rest/v1/ai_feedback_events")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "suggestion_id": "s1",
            "ticket_id": TICKET,
            "feedback_type": "approval",
            "metadata": {"agent_id": "agent_1"},
        })))
        .with_status(201)
        .create_async()
        .await;

    let service = service(&server, Arc::new(NoOpTraceCollector));

    // 1. 조회 → 생성 시각 순 [s1, s2]
    let list = service.fetch_suggestions().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(service.watch().borrow().ids(), vec!["s1", "s2"]);

    // 2. 수락 → 로컬에서 제거, 원격 상태 갱신 + 감사 이벤트
    let outcome = service.accept_suggestion("s1").await.unwrap();
    assert_eq!(outcome.status, SuggestionStatus::Accepted);
    assert!(!outcome.metrics.was_edited);
    assert_eq!(service.watch().borrow().ids(), vec!["s2"]);

    patch.assert_async().await;
    insert.assert_async().await;
}

#[tokio::test]
async fn failed_status_update_rolls_back() {
    let mut server = mockito::Server::new_async().await;
    let _reads = mock_reads(&mut server).await;
    let _patch = server
        .mock("PATCH", "/rest/v1/ai_suggestions")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/rest/v1/ai_feedback_events")
        .expect(0)
        .create_async()
        .await;

    let service = service(&server, Arc::new(NoOpTraceCollector));
    service.fetch_suggestions().await.unwrap();

    let err = service
        .reject_suggestion("s1", Some(FeedbackReason::TooGeneric), None)
        .await
        .unwrap_err();
    assert!(!err.status_committed());

    // 원래 자리로 복원, 항목에 에러 표시
    let view = service.watch().borrow().clone();
    assert_eq!(view.ids(), vec!["s1", "s2"]);
    assert_eq!(view.find("s1").unwrap().status, ViewStatus::Error);
    assert!(view.find("s1").unwrap().error.is_some());
    insert.assert_async().await;
}

#[tokio::test]
async fn feedback_trace_is_ingested() {
    let mut server = mockito::Server::new_async().await;
    let _reads = mock_reads(&mut server).await;
    let _patch = server
        .mock("PATCH", "/rest/v1/ai_suggestions")
        .match_query(Matcher::Any)
        .with_status(204)
        .create_async()
        .await;
    let _insert = server
        .mock("POST", "/rest/v1/ai_feedback_events")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "feedback_reason": "wrong_tone",
            "metadata": {"additional_text": "너무 딱딱함"},
        })))
        .with_status(201)
        .create_async()
        .await;
    let ingestion = server
        .mock("POST", "/api/public/ingestion")
        .match_body(Matcher::Regex("suggestion-feedback".to_string()))
        .with_status(207)
        .with_body(r#"{"successes":[],"errors":[]}"#)
        .create_async()
        .await;

    let tracer = Arc::new(
        HttpTraceCollector::new(&server.url(), "pk", "sk", Duration::from_secs(5)).unwrap(),
    );
    let service = service(&server, tracer.clone());
    service.fetch_suggestions().await.unwrap();

    let outcome = service
        .reject_suggestion(
            "s1",
            Some(FeedbackReason::WrongTone),
            Some("너무 딱딱함".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, SuggestionStatus::Rejected);
    assert!(outcome.trace_flushed);
    assert_eq!(tracer.pending(), 0);
    ingestion.assert_async().await;
}

/// 테스트가 보내는 이벤트를 그대로 흘려보내는 피드
struct ChannelFeed {
    source: Mutex<Option<mpsc::Receiver<ChangeEvent>>>,
}

#[async_trait]
impl ChangeFeed for ChannelFeed {
    async fn subscribe(
        &self,
        _ticket_id: &str,
        tx: mpsc::Sender<ChangeEvent>,
    ) -> Result<(), CoreError> {
        let Some(mut source) = self.source.lock().take() else {
            return Err(CoreError::Network("이미 구독됨".to_string()));
        };
        while let Some(event) = source.recv().await {
            if tx.send(event).await.is_err() {
                return Ok(());
            }
        }
        Err(CoreError::Network("연결 끊김".to_string()))
    }
}

#[tokio::test]
async fn live_updates_reconcile_into_view() {
    let mut server = mockito::Server::new_async().await;
    let _reads = mock_reads(&mut server).await;
    let service = service(&server, Arc::new(NoOpTraceCollector));

    let (events, source) = mpsc::channel(8);
    let feed = Arc::new(ChannelFeed {
        source: Mutex::new(Some(source)),
    });
    let manager = SubscriptionManager::new(feed, 8);

    service.fetch_suggestions().await.unwrap();
    service.start_live_updates(&manager);
    assert!(manager.is_subscribed(TICKET));
    let mut rx = service.watch();

    // 새 제안은 생성 시각 순서 자리에 삽입
    events.send(ChangeEvent::Insert(suggestion("s0", 0))).await.unwrap();
    // 다른 사람이 s1을 수락 → 로컬에서 제거
    let mut accepted = suggestion("s1", 0);
    accepted.status = SuggestionStatus::Accepted;
    events.send(ChangeEvent::Update(accepted)).await.unwrap();
    // 다른 티켓 이벤트는 무시
    let mut foreign = suggestion("x1", 5);
    foreign.ticket_id = "tkt_other".to_string();
    events.send(ChangeEvent::Insert(foreign)).await.unwrap();
    events
        .send(ChangeEvent::Delete { id: "s2".to_string() })
        .await
        .unwrap();

    let view = wait_for(&mut rx, |v| !v.ids().contains(&"s2")).await;
    assert_eq!(view.ids(), vec!["s0"]);

    // 연결 끊김은 뷰 에러로 표면화
    drop(events);
    let view = wait_for(&mut rx, |v| v.error.is_some()).await;
    assert!(view.error.as_ref().unwrap().contains("연결 끊김"));
    assert_eq!(view.ids(), vec!["s0"]);

    assert!(service.stop_live_updates(&manager));
    assert!(!manager.is_subscribed(TICKET));
}

#[tokio::test]
async fn remote_accept_then_local_accept_empties_view() {
    let mut server = mockito::Server::new_async().await;
    let _reads = mock_reads(&mut server).await;
    let _get_s2 = server
        .mock("GET", "/rest/v1/ai_suggestions")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.s2".into()))
        .with_status(200)
        .with_body(format!("[{}]", row("s2", 1)))
        .create_async()
        .await;
    let patch = server
        .mock("PATCH", "/rest/v1/ai_suggestions")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.s2".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({"status": "accepted"})))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/rest/v1/ai_feedback_events")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "suggestion_id": "s2",
            "feedback_type": "approval",
        })))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let service = service(&server, Arc::new(NoOpTraceCollector));
    let (events, source) = mpsc::channel(8);
    let manager = SubscriptionManager::new(
        Arc::new(ChannelFeed {
            source: Mutex::new(Some(source)),
        }),
        8,
    );
    let mut rx = service.watch();

    service.fetch_suggestions().await.unwrap();
    service.start_live_updates(&manager);
    assert_eq!(rx.borrow_and_update().ids(), vec!["s1", "s2"]);

    // 다른 상담원이 s1 수락
    let mut accepted = suggestion("s1", 0);
    accepted.status = SuggestionStatus::Accepted;
    events.send(ChangeEvent::Update(accepted)).await.unwrap();
    let view = wait_for(&mut rx, |v| v.ids() == vec!["s2"]).await;
    assert_eq!(view.status, ViewStatus::Success);

    // 남은 s2를 직접 수락
    let outcome = service.accept_suggestion("s2").await.unwrap();
    assert_eq!(outcome.status, SuggestionStatus::Accepted);
    let view = wait_for(&mut rx, |v| v.ids().is_empty()).await;
    assert!(view.suggestions.is_empty());
    assert!(view.error.is_none());

    patch.assert_async().await;
    insert.assert_async().await;
    assert!(service.stop_live_updates(&manager));
}

#[tokio::test]
async fn generation_request_posts_ticket() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/functions/v1/generate-suggestion")
        .match_body(Matcher::Json(serde_json::json!({"ticket_id": TICKET})))
        .with_status(200)
        .with_body(r#"{"success":true,"suggestion_id":"s_new"}"#)
        .create_async()
        .await;

    let service = service(&server, Arc::new(NoOpTraceCollector));
    let result = service.trigger_generation().await.unwrap();
    assert!(result.success);
    assert_eq!(result.suggestion_id.as_deref(), Some("s_new"));
    mock.assert_async().await;
}
