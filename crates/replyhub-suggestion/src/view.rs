//! 라이브 뷰.
//!
//! 미러 스냅샷 + 항목별 진행 상태 → 호출자에게 보여줄 읽기 전용 데이터.

use chrono::{DateTime, Utc};
use replyhub_core::models::suggestion::Suggestion;
use serde::Serialize;

/// 진행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Loading,
    #[default]
    Success,
    Error,
}

/// 항목별 진행 상태
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ItemState {
    pub status: ViewStatus,
    pub error: Option<String>,
}

impl ItemState {
    pub fn loading() -> Self {
        Self {
            status: ViewStatus::Loading,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ViewStatus::Error,
            error: Some(message.into()),
        }
    }
}

/// 제안 + 일시적 표시 상태 (로컬 전용, 저장하지 않음)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionState {
    pub suggestion: Suggestion,
    pub status: ViewStatus,
    pub error: Option<String>,
}

impl SuggestionState {
    pub fn new(suggestion: Suggestion, state: ItemState) -> Self {
        Self {
            suggestion,
            status: state.status,
            error: state.error,
        }
    }

    /// 생성 시각 상대 표기
    pub fn age_text(&self) -> String {
        format_relative_time(self.suggestion.created_at, Utc::now())
    }
}

/// 티켓 하나의 라이브 뷰
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LiveView {
    /// 전체 조회 상태
    pub status: ViewStatus,
    /// 조회 실패 메시지
    pub error: Option<String>,
    /// 생성 시각 순 제안
    pub suggestions: Vec<SuggestionState>,
}

impl LiveView {
    pub fn ids(&self) -> Vec<&str> {
        self.suggestions
            .iter()
            .map(|s| s.suggestion.id.as_str())
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&SuggestionState> {
        self.suggestions.iter().find(|s| s.suggestion.id == id)
    }
}

pub fn format_relative_time(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - dt;

    if diff.num_seconds() < 60 {
        "방금 전".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}분 전", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}시간 전", diff.num_hours())
    } else {
        format!("{}일 전", diff.num_days())
    }
}
