//! 제안 서비스: 호출자용 진입점.
//!
//! 티켓 하나에 대해 조회, 생성 요청, 수락/거절, 라이브 뷰, 실시간 구독을 묶는다.

use replyhub_core::config::FeedbackConfig;
use replyhub_core::models::agent::AgentIdentity;
use replyhub_core::models::feedback::FeedbackReason;
use replyhub_core::models::suggestion::{GenerationResult, Suggestion};
use replyhub_core::ports::generator::SuggestionGenerator;
use replyhub_core::ports::identity::IdentityProvider;
use replyhub_core::ports::observability::TraceCollector;
use replyhub_core::ports::repository::{SuggestionRepository, TicketRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SuggestionError;
use crate::mirror::SuggestionMirror;
use crate::mutator::OptimisticMutator;
use crate::recorder::{FeedbackOutcome, FeedbackRecorder, FeedbackSubmission};
use crate::subscription::SubscriptionManager;
use crate::view::LiveView;

/// 서비스가 쓰는 포트 묶음
#[derive(Clone)]
pub struct SuggestionPorts {
    pub suggestions: Arc<dyn SuggestionRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub generator: Arc<dyn SuggestionGenerator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub tracer: Arc<dyn TraceCollector>,
}

/// 티켓 하나의 제안 서비스
pub struct SuggestionService {
    mirror: Arc<SuggestionMirror>,
    mutator: OptimisticMutator,
    suggestions: Arc<dyn SuggestionRepository>,
    generator: Arc<dyn SuggestionGenerator>,
    identity: Arc<dyn IdentityProvider>,
    identity_retry_delay: Duration,
}

impl SuggestionService {
    pub fn new(ticket_id: &str, ports: SuggestionPorts, config: &FeedbackConfig) -> Self {
        let mirror = Arc::new(SuggestionMirror::new(ticket_id));
        let recorder = Arc::new(FeedbackRecorder::new(
            ports.suggestions.clone(),
            ports.tickets,
            ports.tracer,
        ));
        Self {
            mutator: OptimisticMutator::new(mirror.clone(), recorder),
            mirror,
            suggestions: ports.suggestions,
            generator: ports.generator,
            identity: ports.identity,
            identity_retry_delay: config.identity_retry_delay(),
        }
    }

    pub fn ticket_id(&self) -> &str {
        self.mirror.ticket_id()
    }

    /// 라이브 뷰 구독 (읽기 전용)
    pub fn watch(&self) -> watch::Receiver<LiveView> {
        self.mirror.subscribe()
    }

    /// 원격 조회로 미러 교체. 실패하면 기존 항목은 그대로 두고 에러 상태만 기록한다.
    pub async fn fetch_suggestions(&self) -> Result<Vec<Suggestion>, SuggestionError> {
        self.mirror.begin_fetch().await;
        match self.suggestions.fetch_suggestions(self.ticket_id()).await {
            Ok(list) => {
                let store = self.mirror.replace(list).await;
                info!("제안 조회: {} ({}건)", self.ticket_id(), store.len());
                Ok(store.list().to_vec())
            }
            Err(e) => {
                warn!(
                    "제안 조회 실패: {} (일시적: {}): {e}",
                    self.ticket_id(),
                    e.is_transient()
                );
                self.mirror.fetch_failed(e.to_string()).await;
                Err(SuggestionError::Fetch(e))
            }
        }
    }

    /// 제안 생성 요청. 생성된 제안은 변경 피드로 들어온다.
    pub async fn trigger_generation(&self) -> Result<GenerationResult, SuggestionError> {
        let result = self
            .generator
            .generate(self.ticket_id())
            .await
            .map_err(SuggestionError::Generation)?;
        if result.success {
            info!(
                "제안 생성 요청 완료: {} → {:?}",
                self.ticket_id(),
                result.suggestion_id
            );
        } else {
            warn!(
                "제안 생성 거부: {} ({})",
                self.ticket_id(),
                result.message.as_deref().unwrap_or("사유 없음")
            );
        }
        Ok(result)
    }

    pub async fn accept_suggestion(
        &self,
        suggestion_id: &str,
    ) -> Result<FeedbackOutcome, SuggestionError> {
        let agent = self.resolve_agent().await?;
        self.mutator.accept(suggestion_id, Some(agent.id)).await
    }

    pub async fn reject_suggestion(
        &self,
        suggestion_id: &str,
        reason: Option<FeedbackReason>,
        additional_text: Option<String>,
    ) -> Result<FeedbackOutcome, SuggestionError> {
        // 사유 누락은 신원 조회 전에 거른다
        FeedbackSubmission::rejection(suggestion_id, self.ticket_id(), reason).validate()?;
        let agent = self.resolve_agent().await?;
        self.mutator
            .reject(suggestion_id, reason, additional_text, Some(agent.id))
            .await
    }

    /// 변경 피드 구독 시작
    pub fn start_live_updates(&self, manager: &SubscriptionManager) {
        manager.subscribe(self.ticket_id(), self.mirror.clone());
    }

    pub fn stop_live_updates(&self, manager: &SubscriptionManager) -> bool {
        manager.unsubscribe(self.ticket_id())
    }

    /// 호출자 신원. 없으면 한 번만 지연 후 재시도한다.
    async fn resolve_agent(&self) -> Result<AgentIdentity, SuggestionError> {
        if let Some(agent) = self.lookup_agent().await {
            return Ok(agent);
        }
        debug!(
            "에이전트 신원 없음, {}ms 후 재시도",
            self.identity_retry_delay.as_millis()
        );
        tokio::time::sleep(self.identity_retry_delay).await;
        self.lookup_agent()
            .await
            .ok_or(SuggestionError::IdentityUnavailable)
    }

    async fn lookup_agent(&self) -> Option<AgentIdentity> {
        match self.identity.current_agent().await {
            Ok(agent) => agent,
            Err(e) => {
                warn!("에이전트 신원 조회 실패: {e}");
                None
            }
        }
    }
}
