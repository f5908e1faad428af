//! 어댑터 와이어링.
//!
//! 설정 → 네트워크 어댑터 → `Arc<dyn Port>` 묶음.

use anyhow::{Context, Result};
use replyhub_core::config::AppConfig;
use replyhub_core::ports::change_feed::ChangeFeed;
use replyhub_core::ports::identity::IdentityProvider;
use replyhub_network::auth::{RemoteIdentity, StaticIdentity};
use replyhub_network::generator_client::HttpSuggestionGenerator;
use replyhub_network::http_client::RestClient;
use replyhub_network::repository::RestSuggestionRepository;
use replyhub_network::sse_client::SseChangeFeed;
use replyhub_network::trace_client::collector_from_config;
use replyhub_suggestion::service::SuggestionPorts;
use std::sync::Arc;
use tracing::info;

/// 와이어링 결과
pub struct Wiring {
    pub ports: SuggestionPorts,
    pub feed: Arc<dyn ChangeFeed>,
}

pub fn build(config: &AppConfig) -> Result<Wiring> {
    let client = RestClient::from_config(&config.server).context("REST 클라이언트 생성 실패")?;
    info!("서버: {}", client.base_url());

    let repository = Arc::new(RestSuggestionRepository::new(client.clone()));

    // 설정에 에이전트가 고정돼 있으면 원격 조회 생략
    let identity: Arc<dyn IdentityProvider> = match &config.agent.agent_id {
        Some(agent_id) => {
            info!("고정 에이전트: {agent_id}");
            Arc::new(StaticIdentity::new(Some(agent_id.clone())))
        }
        None => Arc::new(RemoteIdentity::new(client.clone())),
    };

    let tracer = collector_from_config(&config.observability, config.server.request_timeout())
        .context("트레이스 수집기 생성 실패")?;

    Ok(Wiring {
        ports: SuggestionPorts {
            suggestions: repository.clone(),
            tickets: repository,
            generator: Arc::new(HttpSuggestionGenerator::new(
                client.clone(),
                &config.generator,
            )),
            identity,
            tracer,
        },
        feed: Arc::new(SseChangeFeed::new(client)),
    })
}
