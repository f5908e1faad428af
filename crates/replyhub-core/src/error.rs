//! replyhub 핵심 에러 타입.
//!
//! 포트 구현이 돌려주는 공통 에러. 엔진 쪽 에러(`SuggestionError`)는
//! 어느 단계에서 실패했는지와 함께 이 값을 source로 감싼다.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("설정 에러: {0}")]
    Config(String),

    /// 입력 값 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation { field: String, message: String },

    /// 401/403
    #[error("인증 에러: {0}")]
    Auth(String),

    #[error("{resource_type} 미발견: {id}")]
    NotFound { resource_type: String, id: String },

    /// 429. `Retry-After`가 없으면 기본 대기 시간.
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit { retry_after_secs: u64 },

    /// 503
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 그 밖의 실패 응답
    #[error("원격 에러 ({status}): {message}")]
    Remote { status: u16, message: String },

    /// 연결 실패, 타임아웃, 스트림 끊김
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 응답 본문을 모델로 읽지 못함
    #[error("응답 디코딩 실패: {0}")]
    Decode(String),

    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 같은 요청을 나중에 다시 보내면 성공할 수 있는 에러인지
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimit { .. } | Self::ServiceUnavailable(_) => true,
            Self::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(CoreError::Network("reset".into()).is_transient());
        assert!(CoreError::RateLimit { retry_after_secs: 5 }.is_transient());
        assert!(CoreError::Remote {
            status: 502,
            message: String::new()
        }
        .is_transient());
        assert!(!CoreError::Remote {
            status: 409,
            message: String::new()
        }
        .is_transient());
        assert!(!CoreError::Auth("expired".into()).is_transient());
        assert!(!CoreError::Decode("eof".into()).is_transient());
    }
}
