//! 변경 피드 이벤트 모델.

use crate::models::suggestion::Suggestion;

/// 원격 변경 피드가 전달하는 제안 변경 알림
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// 새 레코드
    Insert(Suggestion),
    /// 기존 레코드 갱신
    Update(Suggestion),
    /// 레코드 삭제
    Delete { id: String },
}

impl ChangeEvent {
    /// 대상 제안 ID
    pub fn suggestion_id(&self) -> &str {
        match self {
            Self::Insert(s) | Self::Update(s) => &s.id,
            Self::Delete { id } => id,
        }
    }

    /// 로그용 이벤트 종류
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete { .. } => "delete",
        }
    }
}
