//! 제안 스토어.
//!
//! 티켓 하나의 제안을 ID로 중복 제거하고 생성 시각 순으로 유지하는 불변 스냅샷.
//! 모든 연산은 새 스냅샷을 반환하며 기존 스냅샷은 변하지 않는다.

use replyhub_core::models::suggestion::Suggestion;
use std::sync::Arc;

/// 제안 스냅샷 (복제는 O(1))
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionStore {
    items: Arc<Vec<Suggestion>>,
}

impl SuggestionStore {
    /// 빈 스토어
    pub fn new() -> Self {
        Self::default()
    }

    /// 조회 결과로 스토어 구성. 같은 ID는 나중 항목이 이긴다.
    pub fn from_snapshot(suggestions: impl IntoIterator<Item = Suggestion>) -> Self {
        suggestions
            .into_iter()
            .fold(Self::new(), |store, s| store.upsert(s))
    }

    /// 없으면 삽입, 있으면 교체. 생성 시각 순서를 유지하고 동률이면 도착 순.
    pub fn upsert(&self, suggestion: Suggestion) -> Self {
        let mut items: Vec<Suggestion> = self
            .items
            .iter()
            .filter(|s| s.id != suggestion.id)
            .cloned()
            .collect();
        let pos = items.partition_point(|s| s.created_at <= suggestion.created_at);
        items.insert(pos, suggestion);
        Self {
            items: Arc::new(items),
        }
    }

    /// ID로 제거. 없으면 같은 스냅샷을 반환한다.
    pub fn remove(&self, id: &str) -> Self {
        if !self.contains(id) {
            return self.clone();
        }
        let items = self.items.iter().filter(|s| s.id != id).cloned().collect();
        Self {
            items: Arc::new(items),
        }
    }

    /// ID로 조회
    pub fn get(&self, id: &str) -> Option<&Suggestion> {
        self.items.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// 생성 시각 순 목록
    pub fn list(&self) -> &[Suggestion] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
