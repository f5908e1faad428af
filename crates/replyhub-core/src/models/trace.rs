//! 관측성 트레이스 모델.
//!
//! 트레이스/스팬 생성 요청과 종료 정보.

use serde::{Deserialize, Serialize};

/// 새 트레이스 요청
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTrace {
    /// 트레이스 이름
    pub name: String,
    /// 세션(상관관계) ID
    pub session_id: String,
    /// 사용자 ID
    pub user_id: Option<String>,
    /// 구조화 입력
    pub input: serde_json::Value,
    /// 메타데이터
    pub metadata: serde_json::Value,
}

/// 새 스팬 요청
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSpan {
    pub name: String,
    pub input: serde_json::Value,
    pub metadata: serde_json::Value,
}

/// 관측 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservationLevel {
    Debug,
    Default,
    Warning,
    Error,
}

/// 스팬 종료 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanEnd {
    pub output: serde_json::Value,
    pub level: ObservationLevel,
    pub status_message: Option<String>,
}

impl SpanEnd {
    /// 정상 종료
    pub fn ok(output: serde_json::Value) -> Self {
        Self {
            output,
            level: ObservationLevel::Default,
            status_message: None,
        }
    }

    /// 에러 종료 (상세 메시지 포함)
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            output: serde_json::json!({ "error": message }),
            level: ObservationLevel::Error,
            status_message: Some(message),
        }
    }
}
