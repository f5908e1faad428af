//! 제안 생성 서비스 클라이언트.
//!
//! `SuggestionGenerator` 포트 구현. 생성 결과 제안은 변경 피드로 들어오므로
//! 여기서는 요청 성공 여부만 돌려준다.

use async_trait::async_trait;
use replyhub_core::config::GeneratorConfig;
use replyhub_core::error::CoreError;
use replyhub_core::models::suggestion::GenerationResult;
use replyhub_core::ports::generator::SuggestionGenerator;
use std::time::Duration;
use tracing::debug;

use crate::http_client::{check_response, transport_error, RestClient};

pub struct HttpSuggestionGenerator {
    client: RestClient,
    path: String,
    timeout: Duration,
}

impl HttpSuggestionGenerator {
    pub fn new(client: RestClient, config: &GeneratorConfig) -> Self {
        Self {
            client,
            path: config.path.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

#[async_trait]
impl SuggestionGenerator for HttpSuggestionGenerator {
    async fn generate(&self, ticket_id: &str) -> Result<GenerationResult, CoreError> {
        debug!("제안 생성 요청: ticket_id={ticket_id}");

        let resp = self
            .client
            .request(reqwest::Method::POST, &self.path)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "ticket_id": ticket_id }))
            .send()
            .await
            .map_err(|e| transport_error("제안 생성 요청", e))?;

        let resp = check_response(resp, "Ticket").await?;
        resp.json()
            .await
            .map_err(|e| CoreError::Decode(format!("생성 응답 파싱 실패: {e}")))
    }
}
