//! 제안 엔진 에러 타입.
//!
//! 어느 단계에서 실패했는지(상태 갱신 전/후)를 호출자가 구분할 수 있어야 한다.

use replyhub_core::error::CoreError;
use replyhub_core::models::suggestion::SuggestionStatus;
use thiserror::Error;

/// 피드백 처리 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStep {
    /// 입력 검증
    Validate,
    /// 제안/티켓 로드
    Load,
    /// Step A: 제안 상태 갱신
    StatusUpdate,
    /// Step B: 피드백 이벤트 삽입
    FeedbackInsert,
}

/// 제안 엔진 에러
#[derive(Debug, Error)]
pub enum SuggestionError {
    /// 원격 읽기 실패. 로컬 상태는 그대로.
    #[error("원격 조회 실패: {0}")]
    Fetch(#[source] CoreError),

    /// 필수 입력 누락
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("제안 미발견: {0}")]
    SuggestionNotFound(String),

    #[error("티켓 미발견: {0}")]
    TicketNotFound(String),

    /// 허용되지 않은 상태 전이 (pending 외 상태에서의 피드백)
    #[error("잘못된 상태 전이: {suggestion_id} {from} → {to}")]
    InvalidTransition {
        suggestion_id: String,
        from: SuggestionStatus,
        to: SuggestionStatus,
    },

    /// Step A 실패. 피드백 이벤트는 기록되지 않았다.
    #[error("제안 상태 갱신 실패 ({suggestion_id}): {source}")]
    StatusUpdateFailed {
        suggestion_id: String,
        #[source]
        source: CoreError,
    },

    /// Step B 실패. 원격 상태는 이미 `status`로 바뀌었고 되돌리지 않는다.
    #[error("피드백 이벤트 기록 실패 ({suggestion_id}, 상태 {status} 반영됨): {source}")]
    FeedbackInsertFailed {
        suggestion_id: String,
        status: SuggestionStatus,
        #[source]
        source: CoreError,
    },

    /// 변경 피드 구독 실패
    #[error("변경 피드 에러 ({ticket_id}): {message}")]
    Channel { ticket_id: String, message: String },

    /// 재시도 후에도 호출자 신원 없음
    #[error("에이전트 신원 확인 불가")]
    IdentityUnavailable,

    /// 제안 생성 서비스 실패
    #[error("제안 생성 실패: {0}")]
    Generation(#[source] CoreError),

    /// 로컬 미러에 없는 제안에 대한 변경 요청
    #[error("로컬 미러에 없는 제안: {0}")]
    NotInMirror(String),
}

impl SuggestionError {
    /// 실패한 피드백 단계 (피드백 경로 에러만)
    pub fn failed_step(&self) -> Option<FeedbackStep> {
        match self {
            Self::Validation { .. } | Self::InvalidTransition { .. } => {
                Some(FeedbackStep::Validate)
            }
            Self::Fetch(_) | Self::SuggestionNotFound(_) | Self::TicketNotFound(_) => {
                Some(FeedbackStep::Load)
            }
            Self::StatusUpdateFailed { .. } => Some(FeedbackStep::StatusUpdate),
            Self::FeedbackInsertFailed { .. } => Some(FeedbackStep::FeedbackInsert),
            _ => None,
        }
    }

    /// 원격 상태 변경이 이미 커밋되었는지
    pub fn status_committed(&self) -> bool {
        matches!(self, Self::FeedbackInsertFailed { .. })
    }
}
