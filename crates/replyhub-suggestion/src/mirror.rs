//! 티켓별 로컬 미러.
//!
//! 스토어와 라이브 뷰의 단일 소유자. 조회 결과, 변경 피드 이벤트, 낙관적 변경이
//! 모두 여기 한 곳의 락을 거친다. 락은 원격 호출 동안 잡지 않는다.

use async_trait::async_trait;
use replyhub_core::models::change::ChangeEvent;
use replyhub_core::models::suggestion::{Suggestion, SuggestionStatus};
use std::collections::HashMap;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::error::SuggestionError;
use crate::mutator::LocalMutation;
use crate::reconciler::{ChangeFeedReconciler, ReconcileAction};
use crate::store::SuggestionStore;
use crate::subscription::ChangeHandler;
use crate::view::{ItemState, LiveView, SuggestionState, ViewStatus};

#[derive(Default)]
struct MirrorState {
    store: SuggestionStore,
    status: ViewStatus,
    error: Option<String>,
    items: HashMap<String, ItemState>,
}

impl MirrorState {
    fn view(&self) -> LiveView {
        LiveView {
            status: self.status,
            error: self.error.clone(),
            suggestions: self
                .store
                .list()
                .iter()
                .map(|s| {
                    let state = self.items.get(&s.id).cloned().unwrap_or_default();
                    SuggestionState::new(s.clone(), state)
                })
                .collect(),
        }
    }

    /// 스토어에서 빠진 항목의 표시 상태를 정리
    fn prune_items(&mut self) {
        let store = &self.store;
        self.items.retain(|id, _| store.contains(id));
    }
}

/// 티켓 하나의 제안 미러
pub struct SuggestionMirror {
    reconciler: ChangeFeedReconciler,
    state: Mutex<MirrorState>,
    view_tx: watch::Sender<LiveView>,
}

impl SuggestionMirror {
    pub fn new(ticket_id: impl Into<String>) -> Self {
        let (view_tx, _) = watch::channel(LiveView::default());
        Self {
            reconciler: ChangeFeedReconciler::new(ticket_id),
            state: Mutex::new(MirrorState::default()),
            view_tx,
        }
    }

    pub fn ticket_id(&self) -> &str {
        self.reconciler.ticket_id()
    }

    /// 라이브 뷰 구독
    pub fn subscribe(&self) -> watch::Receiver<LiveView> {
        self.view_tx.subscribe()
    }

    /// 현재 스냅샷
    pub async fn snapshot(&self) -> SuggestionStore {
        self.state.lock().await.store.clone()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.state.lock().await.store.contains(id)
    }

    /// 조회 시작: 스토어는 그대로 두고 상태만 Loading
    pub async fn begin_fetch(&self) {
        let mut state = self.state.lock().await;
        state.status = ViewStatus::Loading;
        state.error = None;
        self.publish(&state);
    }

    /// 조회 결과로 스토어 교체. pending 제안만 남긴다.
    pub async fn replace(&self, suggestions: Vec<Suggestion>) -> SuggestionStore {
        let mut state = self.state.lock().await;
        state.store = SuggestionStore::from_snapshot(
            suggestions
                .into_iter()
                .filter(|s| s.ticket_id == self.ticket_id())
                .filter(|s| s.status == SuggestionStatus::Pending),
        );
        state.status = ViewStatus::Success;
        state.error = None;
        state.prune_items();
        self.publish(&state);
        state.store.clone()
    }

    /// 조회 실패: 기존 스토어 유지
    pub async fn fetch_failed(&self, message: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.status = ViewStatus::Error;
        state.error = Some(message.into());
        self.publish(&state);
    }

    /// 변경 피드 이벤트 적용
    pub async fn apply_change(&self, event: ChangeEvent) -> ReconcileAction {
        let mut state = self.state.lock().await;
        let reconciled = self.reconciler.apply(&state.store, event);
        if !matches!(reconciled.action, ReconcileAction::Ignored(_)) {
            state.store = reconciled.store;
            state.prune_items();
            self.publish(&state);
        }
        reconciled.action
    }

    /// 로컬 변경 적용, 역변경 반환
    pub async fn apply_mutation(&self, mutation: LocalMutation) -> LocalMutation {
        let mut state = self.state.lock().await;
        let (store, inverse) = mutation.apply(&state.store);
        state.store = store;
        state.prune_items();
        self.publish(&state);
        inverse
    }

    /// 항목 표시 상태 설정. 스토어에 없는 ID는 무시한다.
    pub async fn mark(&self, id: &str, item: ItemState) {
        let mut state = self.state.lock().await;
        if !state.store.contains(id) {
            return;
        }
        state.items.insert(id.to_string(), item);
        self.publish(&state);
    }

    pub async fn clear_mark(&self, id: &str) {
        let mut state = self.state.lock().await;
        if state.items.remove(id).is_some() {
            self.publish(&state);
        }
    }

    fn publish(&self, state: &MirrorState) {
        let view = state.view();
        debug!(
            "라이브 뷰 갱신: ticket={} status={:?} count={}",
            self.ticket_id(),
            view.status,
            view.suggestions.len()
        );
        self.view_tx.send_replace(view);
    }
}

#[async_trait]
impl ChangeHandler for SuggestionMirror {
    async fn on_change(&self, event: ChangeEvent) {
        self.apply_change(event).await;
    }

    async fn on_channel_error(&self, error: &SuggestionError) {
        warn!("변경 피드 중단: {error}");
        let mut state = self.state.lock().await;
        state.error = Some(error.to_string());
        self.publish(&state);
    }
}
