//! 호출자 신원 제공자.
//!
//! 원격 auth 엔드포인트 조회(`RemoteIdentity`) 또는 설정 고정값(`StaticIdentity`).

use async_trait::async_trait;
use replyhub_core::error::CoreError;
use replyhub_core::models::agent::AgentIdentity;
use replyhub_core::ports::identity::IdentityProvider;
use tracing::debug;

use crate::http_client::{check_response, transport_error, RestClient};

/// `GET /auth/v1/user` 로 현재 사용자 조회
pub struct RemoteIdentity {
    client: RestClient,
}

impl RemoteIdentity {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentity {
    async fn current_agent(&self) -> Result<Option<AgentIdentity>, CoreError> {
        let resp = self
            .client
            .request(reqwest::Method::GET, "/auth/v1/user")
            .send()
            .await
            .map_err(|e| transport_error("사용자 조회", e))?;

        // 세션이 아직 없으면 신원 없음
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("로그인 세션 없음");
            return Ok(None);
        }

        let resp = check_response(resp, "User").await?;
        let agent: AgentIdentity = resp
            .json()
            .await
            .map_err(|e| CoreError::Decode(format!("사용자 응답 파싱 실패: {e}")))?;
        debug!("에이전트 확인: {}", agent.id);
        Ok(Some(agent))
    }
}

/// 설정에 고정된 에이전트
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    agent: Option<AgentIdentity>,
}

impl StaticIdentity {
    pub fn new(agent_id: Option<String>) -> Self {
        Self {
            agent: agent_id.map(|id| AgentIdentity { id, email: None }),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_agent(&self) -> Result<Option<AgentIdentity>, CoreError> {
        Ok(self.agent.clone())
    }
}
