//! SSE(Server-Sent Events) 변경 피드 클라이언트.
//!
//! `ChangeFeed` 포트 구현. 연결이 끊기면 에러로 끝나며 재연결하지 않는다.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use replyhub_core::error::CoreError;
use replyhub_core::models::change::ChangeEvent;
use replyhub_core::models::suggestion::Suggestion;
use replyhub_core::ports::change_feed::ChangeFeed;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::http_client::{check_response, transport_error, RestClient};

/// 변경 이벤트 페이로드
#[derive(Debug, Deserialize)]
struct ChangePayload {
    #[serde(default)]
    record: Option<Suggestion>,
    #[serde(default)]
    old_record: Option<OldRecord>,
}

#[derive(Debug, Deserialize)]
struct OldRecord {
    id: String,
}

/// SSE 변경 피드: `ChangeFeed` 포트 구현
pub struct SseChangeFeed {
    client: RestClient,
}

impl SseChangeFeed {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// SSE 이벤트 데이터를 ChangeEvent로 파싱
    fn parse_event(event_type: &str, data: &str) -> Option<ChangeEvent> {
        let kind = event_type.to_ascii_uppercase();
        match kind.as_str() {
            "INSERT" | "UPDATE" | "DELETE" => {}
            "HEARTBEAT" | "PING" => {
                debug!("하트비트");
                return None;
            }
            _ => {
                debug!("알 수 없는 SSE 이벤트 타입: {event_type}");
                return None;
            }
        }

        let payload: ChangePayload = match serde_json::from_str(data) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("변경 이벤트 파싱 실패 ({event_type}): {e}");
                return None;
            }
        };

        match kind.as_str() {
            "INSERT" => payload.record.map(ChangeEvent::Insert),
            "UPDATE" => payload.record.map(ChangeEvent::Update),
            _ => payload
                .old_record
                .map(|old| ChangeEvent::Delete { id: old.id }),
        }
    }
}

#[async_trait]
impl ChangeFeed for SseChangeFeed {
    async fn subscribe(
        &self,
        ticket_id: &str,
        tx: mpsc::Sender<ChangeEvent>,
    ) -> Result<(), CoreError> {
        let path = "/realtime/v1/ai_suggestions/stream";
        info!("SSE 연결 시작: {}{path} (ticket_id={ticket_id})", self.client.base_url());

        let resp = self
            .client
            .request_with_query(reqwest::Method::GET, path, &[("ticket_id", ticket_id)])?
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| transport_error("SSE 연결", e))?;
        let resp = check_response(resp, "ChangeFeed").await?;

        let mut stream = resp.bytes_stream().eventsource();
        while let Some(item) = stream.next().await {
            match item {
                Ok(msg) => {
                    let event_type = if msg.event.is_empty() {
                        "message"
                    } else {
                        msg.event.as_str()
                    };
                    if let Some(event) = Self::parse_event(event_type, &msg.data) {
                        if tx.send(event).await.is_err() {
                            info!("변경 이벤트 채널 닫힘, 연결 종료");
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    warn!("SSE 스트림 에러: {e}");
                    return Err(CoreError::Network(format!("SSE 스트림 에러: {e}")));
                }
            }
        }

        info!("SSE 스트림 종료: {ticket_id}");
        Ok(())
    }
}
