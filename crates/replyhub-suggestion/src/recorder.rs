//! 피드백 기록기.
//!
//! 검증 → 로드 → 트레이스 시작 → Step A(상태 갱신) → Step B(감사 이벤트 삽입)
//! → 파생 메트릭 → 트레이스 종료/전송.
//!
//! Step B가 실패해도 Step A는 되돌리지 않는다. 상태를 pending으로 되돌리면
//! 상태 전이 불변식을 깨기 때문이며, 대신 에러에 반영된 상태를 싣는다.

use chrono::{DateTime, Utc};
use replyhub_core::models::feedback::{FeedbackEvent, FeedbackReason, FeedbackType};
use replyhub_core::models::suggestion::{Suggestion, SuggestionStatus};
use replyhub_core::models::trace::{NewSpan, NewTrace, SpanEnd};
use replyhub_core::ports::observability::TraceCollector;
use replyhub_core::ports::repository::{SuggestionRepository, TicketRepository};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::edit_distance::levenshtein;
use crate::error::SuggestionError;

const TRACE_NAME: &str = "suggestion-feedback";

/// 피드백 제출
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackSubmission {
    pub suggestion_id: String,
    pub ticket_id: String,
    pub feedback_type: FeedbackType,
    pub reason: Option<FeedbackReason>,
    /// 에이전트가 대신 보낸 답변
    pub agent_response: Option<String>,
    pub metadata: Map<String, Value>,
    /// 처리한 에이전트
    pub agent_id: Option<String>,
}

impl FeedbackSubmission {
    pub fn new(suggestion_id: &str, ticket_id: &str, feedback_type: FeedbackType) -> Self {
        Self {
            suggestion_id: suggestion_id.to_string(),
            ticket_id: ticket_id.to_string(),
            feedback_type,
            reason: None,
            agent_response: None,
            metadata: Map::new(),
            agent_id: None,
        }
    }

    /// 승인 제출
    pub fn approval(suggestion_id: &str, ticket_id: &str) -> Self {
        Self::new(suggestion_id, ticket_id, FeedbackType::Approval)
    }

    /// 거절 제출
    pub fn rejection(suggestion_id: &str, ticket_id: &str, reason: Option<FeedbackReason>) -> Self {
        Self {
            reason,
            ..Self::new(suggestion_id, ticket_id, FeedbackType::Rejection)
        }
    }

    pub fn with_agent_response(mut self, text: impl Into<String>) -> Self {
        self.agent_response = Some(text.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_agent(mut self, agent_id: Option<String>) -> Self {
        self.agent_id = agent_id;
        self
    }

    /// approval 외 유형은 사유가 필수
    pub fn validate(&self) -> Result<(), SuggestionError> {
        if self.feedback_type.requires_reason() && self.reason.is_none() {
            return Err(SuggestionError::Validation {
                field: "feedback_reason".to_string(),
                message: format!("{} 피드백에는 사유가 필요합니다", self.feedback_type.as_str()),
            });
        }
        Ok(())
    }

    /// 공백만 있는 대체 답변은 없는 것으로 본다
    fn agent_response(&self) -> Option<&str> {
        self.agent_response
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// 파생 품질 메트릭
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackMetrics {
    /// Step A~B 처리 시간 (밀리초)
    pub processing_time_ms: u64,
    /// 제안 생성부터 피드백까지 (밀리초)
    pub time_to_feedback_ms: i64,
    /// 피드백 전에 제안이 수정되었는지
    pub was_edited: bool,
    /// 원래 제안과 에이전트 답변의 편집 거리 (답변이 있을 때만)
    pub edit_distance: Option<usize>,
}

impl FeedbackMetrics {
    fn compute(
        suggestion: &Suggestion,
        agent_response: Option<&str>,
        processing_time: Duration,
        feedback_at: DateTime<Utc>,
    ) -> Self {
        Self {
            processing_time_ms: processing_time.as_millis() as u64,
            time_to_feedback_ms: (feedback_at - suggestion.created_at).num_milliseconds(),
            was_edited: suggestion.was_edited(),
            edit_distance: agent_response
                .map(|text| levenshtein(&suggestion.suggested_response, text)),
        }
    }
}

/// 기록 성공 결과
#[derive(Debug, Clone)]
pub struct FeedbackOutcome {
    /// 기록된 감사 이벤트
    pub event: FeedbackEvent,
    /// 반영된 제안 상태
    pub status: SuggestionStatus,
    pub trace_id: String,
    pub metrics: FeedbackMetrics,
    /// 트레이스 전송 성공 여부
    pub trace_flushed: bool,
}

/// 피드백 기록기: 상태 갱신 + 감사 이벤트 + 트레이스
pub struct FeedbackRecorder {
    suggestions: Arc<dyn SuggestionRepository>,
    tickets: Arc<dyn TicketRepository>,
    tracer: Arc<dyn TraceCollector>,
}

impl FeedbackRecorder {
    pub fn new(
        suggestions: Arc<dyn SuggestionRepository>,
        tickets: Arc<dyn TicketRepository>,
        tracer: Arc<dyn TraceCollector>,
    ) -> Self {
        Self {
            suggestions,
            tickets,
            tracer,
        }
    }

    /// 피드백 기록
    pub async fn record(
        &self,
        submission: FeedbackSubmission,
    ) -> Result<FeedbackOutcome, SuggestionError> {
        submission.validate()?;

        let suggestion = self
            .suggestions
            .get_suggestion(&submission.suggestion_id)
            .await
            .map_err(SuggestionError::Fetch)?
            .ok_or_else(|| SuggestionError::SuggestionNotFound(submission.suggestion_id.clone()))?;

        if suggestion.ticket_id != submission.ticket_id {
            return Err(SuggestionError::Validation {
                field: "ticket_id".to_string(),
                message: format!(
                    "제안 {}은 티켓 {} 소속입니다",
                    suggestion.id, suggestion.ticket_id
                ),
            });
        }

        let context = self
            .tickets
            .fetch_ticket_context(&submission.ticket_id)
            .await
            .map_err(SuggestionError::Fetch)?
            .ok_or_else(|| SuggestionError::TicketNotFound(submission.ticket_id.clone()))?
            .chronological();

        let new_status = submission.feedback_type.resulting_status();
        if !suggestion.status.can_transition_to(new_status) {
            return Err(SuggestionError::InvalidTransition {
                suggestion_id: suggestion.id.clone(),
                from: suggestion.status,
                to: new_status,
            });
        }

        let trace_id = self.tracer.start_trace(NewTrace {
            name: TRACE_NAME.to_string(),
            session_id: submission.ticket_id.clone(),
            user_id: submission.agent_id.clone(),
            input: json!({
                "suggestion": suggestion,
                "ticket_context": context,
                "feedback": submission,
            }),
            metadata: json!({
                "suggestion_id": suggestion.id,
                "feedback_type": submission.feedback_type,
            }),
        });
        debug!(
            "피드백 트레이스 시작: {trace_id} ({} → {new_status})",
            suggestion.id
        );

        let started = Instant::now();
        let feedback_at = Utc::now();

        // Step A: 상태 갱신
        let span_a = self.tracer.start_span(
            &trace_id,
            NewSpan {
                name: "status-update".to_string(),
                input: json!({
                    "suggestion_id": suggestion.id,
                    "from": suggestion.status,
                    "to": new_status,
                }),
                metadata: json!({}),
            },
        );
        if let Err(e) = self
            .suggestions
            .update_status(&suggestion.id, new_status, feedback_at)
            .await
        {
            error!("제안 상태 갱신 실패: {} → {new_status}: {e}", suggestion.id);
            self.tracer
                .end_span(&trace_id, &span_a, SpanEnd::error(e.to_string()));
            self.tracer.update_trace(
                &trace_id,
                json!({ "error": e.to_string(), "failed_step": "status_update" }),
            );
            self.flush_trace().await;
            return Err(SuggestionError::StatusUpdateFailed {
                suggestion_id: suggestion.id.clone(),
                source: e,
            });
        }
        self.tracer.end_span(
            &trace_id,
            &span_a,
            SpanEnd::ok(json!({ "status": new_status, "updated_at": feedback_at })),
        );

        // Step B: 감사 이벤트 삽입
        let mut metadata = submission.metadata.clone();
        metadata.insert("trace_id".to_string(), json!(trace_id));
        if let Some(agent_id) = &submission.agent_id {
            metadata.insert("agent_id".to_string(), json!(agent_id));
        }
        let event = FeedbackEvent::new(
            &suggestion.id,
            &submission.ticket_id,
            submission.feedback_type,
            submission.reason,
            submission.agent_response().map(str::to_string),
            feedback_at - suggestion.created_at,
            metadata,
            feedback_at,
        );

        let span_b = self.tracer.start_span(
            &trace_id,
            NewSpan {
                name: "feedback-insert".to_string(),
                input: json!(event),
                metadata: json!({}),
            },
        );
        if let Err(e) = self.suggestions.insert_feedback(&event).await {
            error!(
                "피드백 이벤트 기록 실패 (상태 {new_status} 이미 반영): {}: {e}",
                suggestion.id
            );
            self.tracer
                .end_span(&trace_id, &span_b, SpanEnd::error(e.to_string()));
            self.tracer.update_trace(
                &trace_id,
                json!({
                    "error": e.to_string(),
                    "failed_step": "feedback_insert",
                    "status_committed": new_status,
                }),
            );
            self.flush_trace().await;
            return Err(SuggestionError::FeedbackInsertFailed {
                suggestion_id: suggestion.id.clone(),
                status: new_status,
                source: e,
            });
        }
        self.tracer
            .end_span(&trace_id, &span_b, SpanEnd::ok(json!({ "event_id": event.id() })));

        let metrics = FeedbackMetrics::compute(
            &suggestion,
            submission.agent_response(),
            started.elapsed(),
            feedback_at,
        );

        self.tracer.update_trace(
            &trace_id,
            json!({
                "feedback_result": {
                    "status": new_status,
                    "feedback_type": submission.feedback_type,
                    "suggestion_created_at": suggestion.created_at,
                    "feedback_created_at": event.created_at(),
                    "metrics": metrics,
                },
                "suggestion_update": {
                    "new_status": new_status,
                    "edit_distance": metrics.edit_distance,
                },
                "performance": {
                    "response_length": suggestion.suggested_response.chars().count(),
                    "token_count": suggestion.metadata.token_usage.map(|u| u.total_tokens),
                    "processing_time_ms": metrics.processing_time_ms,
                    "total_interaction_time_ms": (Utc::now() - suggestion.created_at).num_milliseconds(),
                },
            }),
        );
        let trace_flushed = self.flush_trace().await;

        info!(
            "피드백 기록 완료: {} {} → {new_status} ({}ms)",
            suggestion.id,
            submission.feedback_type.as_str(),
            metrics.processing_time_ms
        );

        Ok(FeedbackOutcome {
            event,
            status: new_status,
            trace_id,
            metrics,
            trace_flushed,
        })
    }

    async fn flush_trace(&self) -> bool {
        match self.tracer.flush().await {
            Ok(()) => true,
            Err(e) => {
                warn!("트레이스 전송 실패: {e}");
                false
            }
        }
    }
}
