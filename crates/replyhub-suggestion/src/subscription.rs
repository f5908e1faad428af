//! 변경 피드 구독 관리.
//!
//! 티켓마다 구독 하나. 피드 태스크가 이벤트를 채널로 밀어 넣고, 소비 태스크가
//! 순서대로 핸들러에 전달한다. 구독 해제/종료/Drop 시 두 태스크를 모두 중단한다.

use async_trait::async_trait;
use parking_lot::Mutex;
use replyhub_core::models::change::ChangeEvent;
use replyhub_core::ports::change_feed::ChangeFeed;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::SuggestionError;

/// 변경 이벤트 수신자
#[async_trait]
pub trait ChangeHandler: Send + Sync {
    /// 이벤트 하나 처리 (도착 순서대로 호출)
    async fn on_change(&self, event: ChangeEvent);

    /// 피드가 에러로 끝났을 때. 남은 이벤트를 모두 처리한 뒤 호출된다.
    async fn on_channel_error(&self, error: &SuggestionError);
}

struct Subscription {
    feed_task: JoinHandle<()>,
    consumer_task: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.feed_task.abort();
        self.consumer_task.abort();
    }
}

/// 티켓별 구독 관리자
pub struct SubscriptionManager {
    feed: Arc<dyn ChangeFeed>,
    buffer: usize,
    active: Mutex<HashMap<String, Subscription>>,
}

impl SubscriptionManager {
    pub fn new(feed: Arc<dyn ChangeFeed>, buffer: usize) -> Self {
        Self {
            feed,
            buffer: buffer.max(1),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// 구독 시작. 같은 티켓의 기존 구독은 먼저 정리한다.
    ///
    /// tokio 런타임 안에서 호출해야 한다.
    pub fn subscribe(&self, ticket_id: &str, handler: Arc<dyn ChangeHandler>) {
        if self.unsubscribe(ticket_id) {
            info!("기존 구독 교체: {ticket_id}");
        }

        let (tx, mut rx) = mpsc::channel::<ChangeEvent>(self.buffer);
        let (err_tx, err_rx) = oneshot::channel::<SuggestionError>();

        let feed = self.feed.clone();
        let tid = ticket_id.to_string();
        let feed_task = tokio::spawn(async move {
            match feed.subscribe(&tid, tx).await {
                Ok(()) => debug!("변경 피드 종료: {tid}"),
                Err(e) => {
                    error!("변경 피드 에러 ({tid}): {e}");
                    let _ = err_tx.send(SuggestionError::Channel {
                        ticket_id: tid.clone(),
                        message: e.to_string(),
                    });
                }
            }
        });

        let tid = ticket_id.to_string();
        let consumer_task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                debug!("변경 이벤트 수신: {} {}", event.kind(), event.suggestion_id());
                handler.on_change(event).await;
            }
            if let Ok(err) = err_rx.await {
                handler.on_channel_error(&err).await;
            }
            debug!("변경 이벤트 소비 종료: {tid}");
        });

        self.active.lock().insert(
            ticket_id.to_string(),
            Subscription {
                feed_task,
                consumer_task,
            },
        );
        info!("변경 피드 구독: {ticket_id}");
    }

    /// 구독 해제. 구독이 있었으면 true.
    pub fn unsubscribe(&self, ticket_id: &str) -> bool {
        let removed = self.active.lock().remove(ticket_id);
        match removed {
            Some(subscription) => {
                drop(subscription);
                debug!("구독 해제: {ticket_id}");
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self, ticket_id: &str) -> bool {
        self.active.lock().contains_key(ticket_id)
    }

    /// 모든 구독 해제
    pub fn shutdown(&self) {
        let drained: Vec<(String, Subscription)> = self.active.lock().drain().collect();
        if !drained.is_empty() {
            info!("구독 {}개 정리", drained.len());
        }
    }
}
