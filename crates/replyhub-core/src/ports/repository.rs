//! 원격 저장소 포트.
//!
//! 구현: `replyhub-network` crate (PostgREST 스타일 REST)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::models::feedback::FeedbackEvent;
use crate::models::suggestion::{Suggestion, SuggestionStatus};
use crate::models::ticket::TicketContext;

/// 제안/피드백 저장소
#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    /// 티켓의 전체 제안 조회 (생성 시각 오름차순)
    async fn fetch_suggestions(&self, ticket_id: &str) -> Result<Vec<Suggestion>, CoreError>;

    /// ID로 제안 단건 조회. 없으면 `Ok(None)`.
    async fn get_suggestion(&self, suggestion_id: &str) -> Result<Option<Suggestion>, CoreError>;

    /// 제안 상태와 수정 시각 갱신
    async fn update_status(
        &self,
        suggestion_id: &str,
        status: SuggestionStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), CoreError>;

    /// 피드백 이벤트 삽입 (수정/삭제 경로 없음)
    async fn insert_feedback(&self, event: &FeedbackEvent) -> Result<(), CoreError>;
}

/// 티켓 저장소 (읽기 전용)
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// 티켓과 대화 이력 조회. 없으면 `Ok(None)`.
    async fn fetch_ticket_context(&self, ticket_id: &str)
        -> Result<Option<TicketContext>, CoreError>;
}
