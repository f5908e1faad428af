//! 호출자 신원 포트.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::agent::AgentIdentity;

/// 현재 에이전트 신원 제공자
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 현재 에이전트. 아직 알 수 없으면 `Ok(None)`.
    async fn current_agent(&self) -> Result<Option<AgentIdentity>, CoreError>;
}
