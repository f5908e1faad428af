//! 제안 생성 서비스 포트.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::suggestion::GenerationResult;

/// 외부 제안 생성 서비스
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// 티켓에 대한 제안 생성 요청
    async fn generate(&self, ticket_id: &str) -> Result<GenerationResult, CoreError>;
}
