//! 단위 테스트용 포트 목(mock) 구현.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use replyhub_core::error::CoreError;
use replyhub_core::models::feedback::FeedbackEvent;
use replyhub_core::models::suggestion::{
    Suggestion, SuggestionMetadata, SuggestionStatus, TokenUsage,
};
use replyhub_core::models::ticket::{AuthorType, Ticket, TicketContext, TicketMessage};
use replyhub_core::models::trace::{NewSpan, NewTrace, SpanEnd};
use replyhub_core::ports::observability::TraceCollector;
use replyhub_core::ports::repository::{SuggestionRepository, TicketRepository};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const TICKET: &str = "tkt_1";

pub fn make_suggestion(id: &str, created_at: DateTime<Utc>) -> Suggestion {
    Suggestion {
        id: id.to_string(),
        ticket_id: TICKET.to_string(),
        suggested_response: "주문하신 상품은 내일 도착 예정입니다.".to_string(),
        status: SuggestionStatus::Pending,
        metadata: SuggestionMetadata {
            model: Some("gpt-4o".to_string()),
            trace_id: Some("gen_trace".to_string()),
            token_usage: Some(TokenUsage {
                prompt_tokens: 120,
                completion_tokens: 30,
                total_tokens: 150,
            }),
            partial_use: None,
        },
        created_at,
        updated_at: created_at,
    }
}

pub fn make_context(ticket_id: &str) -> TicketContext {
    let base = Utc::now() - Duration::hours(1);
    TicketContext {
        ticket: Ticket {
            id: ticket_id.to_string(),
            subject: Some("배송 문의".to_string()),
            status: Some("open".to_string()),
            created_at: base,
        },
        messages: vec![
            TicketMessage {
                id: "m2".to_string(),
                content: "확인 부탁드려요".to_string(),
                author_type: AuthorType::Customer,
                created_at: base + Duration::minutes(10),
            },
            TicketMessage {
                id: "m1".to_string(),
                content: "배송이 언제 되나요?".to_string(),
                author_type: AuthorType::Customer,
                created_at: base,
            },
        ],
    }
}

/// 메모리 저장소 + 실패 주입
#[derive(Default)]
pub struct MockRepository {
    pub suggestions: Mutex<HashMap<String, Suggestion>>,
    pub events: Mutex<Vec<FeedbackEvent>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_fetch: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_insert: AtomicBool,
}

impl MockRepository {
    pub fn with(suggestions: Vec<Suggestion>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.suggestions.lock();
            for s in suggestions {
                map.insert(s.id.clone(), s);
            }
        }
        repo
    }

    pub fn status_of(&self, id: &str) -> Option<SuggestionStatus> {
        self.suggestions.lock().get(id).map(|s| s.status)
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SuggestionRepository for MockRepository {
    async fn fetch_suggestions(&self, ticket_id: &str) -> Result<Vec<Suggestion>, CoreError> {
        self.calls.lock().push(format!("fetch:{ticket_id}"));
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(CoreError::Network("조회 실패".to_string()));
        }
        let mut list: Vec<Suggestion> = self
            .suggestions
            .lock()
            .values()
            .filter(|s| s.ticket_id == ticket_id)
            .cloned()
            .collect();
        list.sort_by_key(|s| s.created_at);
        Ok(list)
    }

    async fn get_suggestion(&self, suggestion_id: &str) -> Result<Option<Suggestion>, CoreError> {
        self.calls.lock().push(format!("get:{suggestion_id}"));
        Ok(self.suggestions.lock().get(suggestion_id).cloned())
    }

    async fn update_status(
        &self,
        suggestion_id: &str,
        status: SuggestionStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.calls.lock().push(format!("update:{suggestion_id}:{status}"));
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(CoreError::ServiceUnavailable("db down".to_string()));
        }
        let mut map = self.suggestions.lock();
        let s = map.get_mut(suggestion_id).ok_or_else(|| CoreError::NotFound {
            resource_type: "Suggestion".to_string(),
            id: suggestion_id.to_string(),
        })?;
        s.status = status;
        s.updated_at = updated_at;
        Ok(())
    }

    async fn insert_feedback(&self, event: &FeedbackEvent) -> Result<(), CoreError> {
        self.calls
            .lock()
            .push(format!("insert:{}", event.suggestion_id()));
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(CoreError::Internal("constraint violation".to_string()));
        }
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// 고정 티켓 컨텍스트
#[derive(Default)]
pub struct MockTickets {
    pub contexts: HashMap<String, TicketContext>,
}

impl MockTickets {
    pub fn with(context: TicketContext) -> Self {
        let mut contexts = HashMap::new();
        contexts.insert(context.ticket.id.clone(), context);
        Self { contexts }
    }
}

#[async_trait]
impl TicketRepository for MockTickets {
    async fn fetch_ticket_context(
        &self,
        ticket_id: &str,
    ) -> Result<Option<TicketContext>, CoreError> {
        Ok(self.contexts.get(ticket_id).cloned())
    }
}

/// 호출 기록용 트레이스 수집기
#[derive(Default)]
pub struct RecordingTracer {
    pub traces: Mutex<Vec<NewTrace>>,
    pub spans: Mutex<Vec<NewSpan>>,
    pub span_ends: Mutex<Vec<SpanEnd>>,
    pub outputs: Mutex<Vec<serde_json::Value>>,
    pub flushes: AtomicUsize,
    pub fail_flush: AtomicBool,
}

#[async_trait]
impl TraceCollector for RecordingTracer {
    fn start_trace(&self, trace: NewTrace) -> String {
        let mut traces = self.traces.lock();
        traces.push(trace);
        format!("trace_{}", traces.len())
    }

    fn start_span(&self, _trace_id: &str, span: NewSpan) -> String {
        let mut spans = self.spans.lock();
        spans.push(span);
        format!("span_{}", spans.len())
    }

    fn end_span(&self, _trace_id: &str, _span_id: &str, end: SpanEnd) {
        self.span_ends.lock().push(end);
    }

    fn update_trace(&self, _trace_id: &str, output: serde_json::Value) {
        self.outputs.lock().push(output);
    }

    async fn flush(&self) -> Result<(), CoreError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.fail_flush.load(Ordering::SeqCst) {
            return Err(CoreError::Network("collector down".to_string()));
        }
        Ok(())
    }
}
