//! 라이프사이클 관리.
//!
//! 종료 플래그 하나를 watch 채널로 공유한다. 시그널 수신 또는 직접 호출로 켜진다.

use tokio::sync::watch;
use tracing::{debug, info};

pub struct LifecycleManager {
    stop_tx: watch::Sender<bool>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self { stop_tx }
    }

    pub fn is_stopping(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// 종료 플래그 설정. 두 번째 호출부터는 무시된다.
    pub fn shutdown(&self) {
        if self.stop_tx.send_replace(true) {
            debug!("이미 종료 중");
        } else {
            info!("종료 신호 발송");
        }
    }

    /// 종료 플래그가 켜질 때까지 대기
    pub async fn stopped(&self) {
        let mut rx = self.stop_tx.subscribe();
        // 송신자는 self가 들고 있으므로 닫히지 않는다
        let _ = rx.wait_for(|stopping| *stopping).await;
    }

    /// SIGINT/SIGTERM(비 unix는 Ctrl+C) 대기 후 종료 플래그 설정
    pub async fn wait_for_signal(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::select! {
                _ = sigint.recv() => info!("SIGINT 수신"),
                _ = sigterm.recv() => info!("SIGTERM 수신"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            info!("Ctrl+C 수신");
        }

        self.shutdown();
        Ok(())
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
