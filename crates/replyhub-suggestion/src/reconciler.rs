//! 변경 피드 조정기.
//!
//! 원격 insert/update/delete 이벤트를 스토어 연산으로 매핑한다.
//! 티켓 ID 외에는 상태를 갖지 않는다.

use replyhub_core::models::change::ChangeEvent;
use replyhub_core::models::suggestion::Suggestion;
use tracing::debug;

use crate::store::SuggestionStore;

/// 이벤트 적용 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// 새로 추가됨
    Inserted,
    /// 기존 항목에 병합됨
    Merged,
    /// 제거됨
    Removed,
    /// 스토어 변화 없음
    Ignored(IgnoreReason),
}

/// 무시 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// 이미 있는 ID의 insert
    DuplicateInsert,
    /// 없는 ID의 delete 또는 종결 update
    Absent,
    /// 다른 티켓의 레코드
    ForeignTicket,
}

/// 조정 결과: 새 스냅샷 + 수행한 동작
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub store: SuggestionStore,
    pub action: ReconcileAction,
}

/// 티켓 하나의 변경 피드 조정기
#[derive(Debug, Clone)]
pub struct ChangeFeedReconciler {
    ticket_id: String,
}

impl ChangeFeedReconciler {
    pub fn new(ticket_id: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
        }
    }

    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    /// 이벤트 하나를 적용한 새 스냅샷을 계산한다.
    pub fn apply(&self, store: &SuggestionStore, event: ChangeEvent) -> Reconciled {
        let reconciled = match event {
            ChangeEvent::Insert(record) => self.on_insert(store, record),
            ChangeEvent::Update(record) => self.on_update(store, record),
            ChangeEvent::Delete { id } => on_delete(store, &id),
        };
        debug!(
            "변경 피드 조정: ticket={} action={:?} size={}",
            self.ticket_id,
            reconciled.action,
            reconciled.store.len()
        );
        reconciled
    }

    /// 이벤트 시퀀스를 순서대로 적용한다.
    pub fn apply_all(
        &self,
        store: &SuggestionStore,
        events: impl IntoIterator<Item = ChangeEvent>,
    ) -> SuggestionStore {
        events
            .into_iter()
            .fold(store.clone(), |acc, event| self.apply(&acc, event).store)
    }

    fn on_insert(&self, store: &SuggestionStore, record: Suggestion) -> Reconciled {
        if record.ticket_id != self.ticket_id {
            return ignored(store, IgnoreReason::ForeignTicket);
        }
        if store.contains(&record.id) {
            return ignored(store, IgnoreReason::DuplicateInsert);
        }
        Reconciled {
            store: store.upsert(record),
            action: ReconcileAction::Inserted,
        }
    }

    fn on_update(&self, store: &SuggestionStore, record: Suggestion) -> Reconciled {
        if record.ticket_id != self.ticket_id {
            return ignored(store, IgnoreReason::ForeignTicket);
        }

        // 종결 상태는 이전 로컬 상태와 관계없이 활성 집합에서 뺀다
        if record.status.is_terminal() {
            return on_delete(store, &record.id);
        }

        match store.get(&record.id) {
            Some(existing) => {
                let mut merged = existing.clone();
                merged.merge_from(record);
                Reconciled {
                    store: store.upsert(merged),
                    action: ReconcileAction::Merged,
                }
            }
            None => Reconciled {
                store: store.upsert(record),
                action: ReconcileAction::Inserted,
            },
        }
    }
}

fn on_delete(store: &SuggestionStore, id: &str) -> Reconciled {
    if !store.contains(id) {
        return ignored(store, IgnoreReason::Absent);
    }
    Reconciled {
        store: store.remove(id),
        action: ReconcileAction::Removed,
    }
}

fn ignored(store: &SuggestionStore, reason: IgnoreReason) -> Reconciled {
    Reconciled {
        store: store.clone(),
        action: ReconcileAction::Ignored(reason),
    }
}
