//! 제안 모델.
//!
//! 티켓에 붙는 AI 답변 제안과 상태 전이 규칙.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI 답변 제안 (원격 저장소의 `ai_suggestions` 행)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// 제안 고유 ID
    pub id: String,
    /// 소속 티켓 ID
    pub ticket_id: String,
    /// 제안된 답변 본문
    pub suggested_response: String,
    /// 처리 상태
    pub status: SuggestionStatus,
    /// 생성 모델/트레이스/토큰 메타데이터
    #[serde(default)]
    pub metadata: SuggestionMetadata,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl Suggestion {
    /// 생성 이후 수정된 적이 있는지 (updated_at ≠ created_at)
    pub fn was_edited(&self) -> bool {
        self.updated_at != self.created_at
    }

    /// 다른 레코드의 필드를 병합한다.
    ///
    /// 본문/상태/시각은 들어온 값이 이기고, 메타데이터는 값이 있는 필드만 덮어쓴다.
    pub fn merge_from(&mut self, incoming: Suggestion) {
        self.ticket_id = incoming.ticket_id;
        self.suggested_response = incoming.suggested_response;
        self.status = incoming.status;
        self.created_at = incoming.created_at;
        self.updated_at = incoming.updated_at;
        self.metadata.merge_from(incoming.metadata);
    }
}

/// 제안 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    /// 에이전트 처분 대기
    Pending,
    /// 수락됨
    Accepted,
    /// 거절됨
    Rejected,
}

impl SuggestionStatus {
    /// 종결 상태(accepted/rejected)인지
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// 허용된 전이인지: pending → accepted | rejected 만 유효하다.
    pub fn can_transition_to(self, next: SuggestionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Rejected)
        )
    }

    /// 와이어 표현 문자열
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 제안 메타데이터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionMetadata {
    /// 생성 모델 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 생성 시점 트레이스 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// 토큰 사용량
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    /// 에이전트가 일부만 사용했는지
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_use: Option<bool>,
}

impl SuggestionMetadata {
    fn merge_from(&mut self, incoming: SuggestionMetadata) {
        if incoming.model.is_some() {
            self.model = incoming.model;
        }
        if incoming.trace_id.is_some() {
            self.trace_id = incoming.trace_id;
        }
        if incoming.token_usage.is_some() {
            self.token_usage = incoming.token_usage;
        }
        if incoming.partial_use.is_some() {
            self.partial_use = incoming.partial_use;
        }
    }
}

/// 토큰 사용량
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// 제안 생성 서비스 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// 생성 성공 여부
    pub success: bool,
    /// 생성된 제안 ID (있으면)
    #[serde(default)]
    pub suggestion_id: Option<String>,
    /// 서비스 메시지
    #[serde(default)]
    pub message: Option<String>,
}
