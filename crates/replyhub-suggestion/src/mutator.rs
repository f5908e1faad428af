//! 낙관적 변경기.
//!
//! 로컬 미러를 먼저 바꾸고 원격 결과를 기다린다. 원격이 실패하면 역변경을
//! 적용해 되돌린 뒤 에러를 그대로 돌려준다.

use replyhub_core::models::feedback::FeedbackReason;
use replyhub_core::models::suggestion::Suggestion;
use serde_json::{json, Map};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::SuggestionError;
use crate::mirror::SuggestionMirror;
use crate::recorder::{FeedbackOutcome, FeedbackRecorder, FeedbackSubmission};
use crate::store::SuggestionStore;
use crate::view::ItemState;

/// 되돌릴 수 있는 로컬 변경
#[derive(Debug, Clone, PartialEq)]
pub enum LocalMutation {
    Upsert(Suggestion),
    Remove(String),
}

impl LocalMutation {
    /// 변경을 적용한 새 스냅샷과 역변경
    pub fn apply(self, store: &SuggestionStore) -> (SuggestionStore, LocalMutation) {
        match self {
            Self::Upsert(suggestion) => {
                let inverse = restore_or_remove(store, &suggestion.id);
                (store.upsert(suggestion), inverse)
            }
            Self::Remove(id) => {
                let inverse = restore_or_remove(store, &id);
                (store.remove(&id), inverse)
            }
        }
    }
}

fn restore_or_remove(store: &SuggestionStore, id: &str) -> LocalMutation {
    match store.get(id) {
        Some(previous) => LocalMutation::Upsert(previous.clone()),
        None => LocalMutation::Remove(id.to_string()),
    }
}

/// 수락/거절 실행기
pub struct OptimisticMutator {
    mirror: Arc<SuggestionMirror>,
    recorder: Arc<FeedbackRecorder>,
}

impl OptimisticMutator {
    pub fn new(mirror: Arc<SuggestionMirror>, recorder: Arc<FeedbackRecorder>) -> Self {
        Self { mirror, recorder }
    }

    /// 로컬 변경 → 원격 대기 → 실패 시 역변경 후 에러 반환.
    /// 원격 상태가 이미 바뀐 에러면 역변경하지 않는다.
    pub async fn run_optimistic<T, F>(
        &self,
        mutation: LocalMutation,
        remote: F,
    ) -> Result<T, SuggestionError>
    where
        F: Future<Output = Result<T, SuggestionError>>,
    {
        let inverse = self.mirror.apply_mutation(mutation).await;
        match remote.await {
            Ok(value) => Ok(value),
            Err(e) if e.status_committed() => {
                error!("원격 상태는 반영됨, 로컬 변경 유지: {e}");
                Err(e)
            }
            Err(e) => {
                warn!("원격 변경 실패, 로컬 롤백: {e}");
                self.mirror.apply_mutation(inverse).await;
                Err(e)
            }
        }
    }

    /// 제안 수락. 원격 기록이 성공한 뒤에만 로컬에서 뺀다.
    pub async fn accept(
        &self,
        suggestion_id: &str,
        agent_id: Option<String>,
    ) -> Result<FeedbackOutcome, SuggestionError> {
        self.ensure_present(suggestion_id).await?;
        self.mirror.mark(suggestion_id, ItemState::loading()).await;

        let submission = FeedbackSubmission::approval(suggestion_id, self.mirror.ticket_id())
            .with_agent(agent_id);
        match self.recorder.record(submission).await {
            Ok(outcome) => {
                self.mirror
                    .apply_mutation(LocalMutation::Remove(suggestion_id.to_string()))
                    .await;
                info!("제안 수락: {suggestion_id}");
                Ok(outcome)
            }
            Err(e) if e.status_committed() => {
                // 원격은 이미 accepted: 활성 목록에 남기지 않는다
                error!("수락 상태는 반영됨, 감사 이벤트 누락: {e}");
                self.mirror
                    .apply_mutation(LocalMutation::Remove(suggestion_id.to_string()))
                    .await;
                Err(e)
            }
            Err(e) => {
                self.mirror
                    .mark(suggestion_id, ItemState::failed(e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    /// 제안 거절. 로컬에서 먼저 빼고, 원격 실패 시 원래 내용으로 되돌린다.
    pub async fn reject(
        &self,
        suggestion_id: &str,
        reason: Option<FeedbackReason>,
        additional_text: Option<String>,
        agent_id: Option<String>,
    ) -> Result<FeedbackOutcome, SuggestionError> {
        let mut metadata = Map::new();
        if let Some(text) = additional_text.filter(|t| !t.trim().is_empty()) {
            metadata.insert("additional_text".to_string(), json!(text));
        }
        let submission =
            FeedbackSubmission::rejection(suggestion_id, self.mirror.ticket_id(), reason)
                .with_metadata(metadata)
                .with_agent(agent_id);
        submission.validate()?;
        self.ensure_present(suggestion_id).await?;

        self.mirror.mark(suggestion_id, ItemState::loading()).await;
        let result = self
            .run_optimistic(
                LocalMutation::Remove(suggestion_id.to_string()),
                self.recorder.record(submission),
            )
            .await;

        match &result {
            Ok(_) => info!("제안 거절: {suggestion_id}"),
            Err(e) => {
                self.mirror
                    .mark(suggestion_id, ItemState::failed(e.to_string()))
                    .await
            }
        }
        result
    }

    async fn ensure_present(&self, suggestion_id: &str) -> Result<(), SuggestionError> {
        if self.mirror.contains(suggestion_id).await {
            Ok(())
        } else {
            Err(SuggestionError::NotInMirror(suggestion_id.to_string()))
        }
    }
}
