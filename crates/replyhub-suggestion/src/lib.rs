//! # replyhub-suggestion
//!
//! 제안 수명주기 엔진.
//! 티켓별 제안 미러를 원격 변경 피드와 맞추고, 수락/거절을 낙관적으로
//! 반영하며, 상태 전이와 감사 이벤트를 함께 기록한다.
//!
//! ## 구조
//!
//! - [`store`]: 생성 시각 순 불변 스냅샷
//! - [`reconciler`]: 변경 이벤트 → 스토어 연산
//! - [`recorder`]: 상태 갱신 + 피드백 이벤트 + 트레이스
//! - [`mutator`]: 낙관적 변경과 롤백
//! - [`mirror`] / [`view`]: 티켓별 단일 소유자와 라이브 뷰
//! - [`subscription`]: 변경 피드 구독 수명 관리
//! - [`service`]: 호출자용 진입점

pub mod edit_distance;
pub mod error;
pub mod mirror;
pub mod mutator;
pub mod reconciler;
pub mod recorder;
pub mod service;
pub mod store;
pub mod subscription;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;
