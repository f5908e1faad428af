//! 변경 피드 포트.
//!
//! 구현: `replyhub-network` crate (SSE)

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::CoreError;
use crate::models::change::ChangeEvent;

/// 티켓 단위 제안 변경 스트림
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// 티켓의 변경 이벤트를 `tx`로 순서대로 전달한다.
    ///
    /// 수신 채널이 닫히면 `Ok(())`로 끝나고, 스트림이 실패하면 에러를 반환한다.
    /// 자동 재연결은 하지 않는다.
    async fn subscribe(
        &self,
        ticket_id: &str,
        tx: mpsc::Sender<ChangeEvent>,
    ) -> Result<(), CoreError>;
}
