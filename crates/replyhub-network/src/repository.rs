//! REST 저장소 어댑터.
//!
//! `SuggestionRepository` / `TicketRepository` 포트 구현.
//! PostgREST 규칙(`{base}/rest/v1/{table}?col=eq.value`)을 따른다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use replyhub_core::error::CoreError;
use replyhub_core::models::feedback::FeedbackEvent;
use replyhub_core::models::suggestion::{Suggestion, SuggestionStatus};
use replyhub_core::models::ticket::{Ticket, TicketContext, TicketMessage};
use replyhub_core::ports::repository::{SuggestionRepository, TicketRepository};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http_client::{check_response, transport_error, RestClient};

const REST_PREFIX: &str = "/rest/v1";

/// REST 저장소: 제안/피드백/티켓
pub struct RestSuggestionRepository {
    client: RestClient,
}

impl RestSuggestionRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// 행 목록 조회
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
        resource_type: &str,
    ) -> Result<Vec<T>, CoreError> {
        let path = format!("{REST_PREFIX}/{table}");
        let resp = self
            .client
            .request_with_query(Method::GET, &path, query)?
            .send()
            .await
            .map_err(|e| transport_error(&format!("{table} 조회"), e))?;

        let resp = check_response(resp, resource_type).await?;
        resp.json()
            .await
            .map_err(|e| CoreError::Decode(format!("{table} 응답 파싱 실패: {e}")))
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        resource_type: &str,
    ) -> Result<Option<T>, CoreError> {
        let filter = format!("eq.{id}");
        let rows = self
            .select(table, &[("id", filter.as_str()), ("limit", "1")], resource_type)
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl SuggestionRepository for RestSuggestionRepository {
    async fn fetch_suggestions(&self, ticket_id: &str) -> Result<Vec<Suggestion>, CoreError> {
        debug!("제안 조회 요청: ticket_id={ticket_id}");
        let filter = format!("eq.{ticket_id}");
        self.select(
            "ai_suggestions",
            &[("ticket_id", filter.as_str()), ("order", "created_at.asc")],
            "Suggestion",
        )
        .await
    }

    async fn get_suggestion(&self, suggestion_id: &str) -> Result<Option<Suggestion>, CoreError> {
        self.select_one("ai_suggestions", suggestion_id, "Suggestion")
            .await
    }

    async fn update_status(
        &self,
        suggestion_id: &str,
        status: SuggestionStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        debug!("제안 상태 갱신: {suggestion_id} → {status}");
        let path = format!("{REST_PREFIX}/ai_suggestions");
        let filter = format!("eq.{suggestion_id}");
        let body = serde_json::json!({
            "status": status,
            "updated_at": updated_at,
        });

        let resp = self
            .client
            .request_with_query(Method::PATCH, &path, &[("id", filter.as_str())])?
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("제안 상태 갱신", e))?;

        check_response(resp, "Suggestion").await?;
        Ok(())
    }

    async fn insert_feedback(&self, event: &FeedbackEvent) -> Result<(), CoreError> {
        debug!(
            "피드백 이벤트 기록: {} ({})",
            event.suggestion_id(),
            event.feedback_type().as_str()
        );
        let path = format!("{REST_PREFIX}/ai_feedback_events");

        let resp = self
            .client
            .request(Method::POST, &path)
            .header("Prefer", "return=minimal")
            .json(event)
            .send()
            .await
            .map_err(|e| transport_error("피드백 이벤트 기록", e))?;

        check_response(resp, "FeedbackEvent").await?;
        Ok(())
    }
}

#[async_trait]
impl TicketRepository for RestSuggestionRepository {
    async fn fetch_ticket_context(
        &self,
        ticket_id: &str,
    ) -> Result<Option<TicketContext>, CoreError> {
        let Some(ticket) = self
            .select_one::<Ticket>("tickets", ticket_id, "Ticket")
            .await?
        else {
            return Ok(None);
        };

        let filter = format!("eq.{ticket_id}");
        let messages: Vec<TicketMessage> = self
            .select(
                "ticket_messages",
                &[("ticket_id", filter.as_str()), ("order", "created_at.asc")],
                "TicketMessage",
            )
            .await?;

        debug!("티켓 컨텍스트: {ticket_id} (메시지 {}건)", messages.len());
        Ok(Some(TicketContext { ticket, messages }))
    }
}
