//! 티켓 컨텍스트 모델.
//!
//! 피드백 트레이스 입력으로 쓰이는 티켓 요약과 대화 이력.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 지원 티켓 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// 티켓 ID
    pub id: String,
    /// 제목
    #[serde(default)]
    pub subject: Option<String>,
    /// 티켓 상태 (외부 시스템 값 그대로)
    #[serde(default)]
    pub status: Option<String>,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

/// 메시지 작성자 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorType {
    Customer,
    Agent,
    System,
    Ai,
}

/// 티켓 대화 메시지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: String,
    pub content: String,
    pub author_type: AuthorType,
    pub created_at: DateTime<Utc>,
}

/// 티켓 + 대화 이력
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketContext {
    pub ticket: Ticket,
    pub messages: Vec<TicketMessage>,
}

impl TicketContext {
    /// 대화 이력을 오래된 순으로 정렬한 사본
    pub fn chronological(&self) -> TicketContext {
        let mut ordered = self.clone();
        ordered.messages.sort_by_key(|m| m.created_at);
        ordered
    }
}
