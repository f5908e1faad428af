//! 관측성 트레이스 수집기.
//!
//! `TraceCollector` 포트 구현. 트레이스/스팬 이벤트를 메모리에 쌓아 두고
//! `flush` 때 한 번의 배치로 ingestion API에 보낸다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use replyhub_core::config::ObservabilityConfig;
use replyhub_core::error::CoreError;
use replyhub_core::models::trace::{NewSpan, NewTrace, SpanEnd};
use replyhub_core::ports::observability::TraceCollector;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::http_client::{check_response, transport_error};

const INGESTION_PATH: &str = "/api/public/ingestion";

/// ingestion 배치 항목
#[derive(Debug, Clone, Serialize)]
struct IngestionEvent {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    timestamp: DateTime<Utc>,
    body: Value,
}

impl IngestionEvent {
    fn new(kind: &'static str, body: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            timestamp: Utc::now(),
            body,
        }
    }
}

/// HTTP 트레이스 수집기
pub struct HttpTraceCollector {
    client: reqwest::Client,
    host: String,
    public_key: String,
    secret_key: String,
    buffer: Mutex<Vec<IngestionEvent>>,
}

impl HttpTraceCollector {
    pub fn new(
        host: &str,
        public_key: &str,
        secret_key: &str,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            public_key: public_key.to_string(),
            secret_key: secret_key.to_string(),
            buffer: Mutex::new(Vec::new()),
        })
    }

    /// 관측성 설정으로 생성. 키가 없으면 설정 에러.
    pub fn from_config(config: &ObservabilityConfig, timeout: Duration) -> Result<Self, CoreError> {
        let (Some(public_key), Some(secret_key)) = (&config.public_key, &config.secret_key) else {
            return Err(CoreError::Config(
                "observability.public_key / secret_key 필요".to_string(),
            ));
        };
        Self::new(&config.host, public_key, secret_key, timeout)
    }

    /// 전송 대기 중인 이벤트 수
    pub fn pending(&self) -> usize {
        self.buffer.lock().len()
    }

    fn push(&self, event: IngestionEvent) {
        self.buffer.lock().push(event);
    }
}

#[async_trait]
impl TraceCollector for HttpTraceCollector {
    fn start_trace(&self, trace: NewTrace) -> String {
        let id = Uuid::new_v4().to_string();
        self.push(IngestionEvent::new(
            "trace-create",
            json!({
                "id": id,
                "name": trace.name,
                "sessionId": trace.session_id,
                "userId": trace.user_id,
                "input": trace.input,
                "metadata": trace.metadata,
                "timestamp": Utc::now(),
            }),
        ));
        id
    }

    fn start_span(&self, trace_id: &str, span: NewSpan) -> String {
        let id = Uuid::new_v4().to_string();
        self.push(IngestionEvent::new(
            "span-create",
            json!({
                "id": id,
                "traceId": trace_id,
                "name": span.name,
                "input": span.input,
                "metadata": span.metadata,
                "startTime": Utc::now(),
            }),
        ));
        id
    }

    fn end_span(&self, trace_id: &str, span_id: &str, end: SpanEnd) {
        self.push(IngestionEvent::new(
            "span-update",
            json!({
                "id": span_id,
                "traceId": trace_id,
                "output": end.output,
                "level": end.level,
                "statusMessage": end.status_message,
                "endTime": Utc::now(),
            }),
        ));
    }

    fn update_trace(&self, trace_id: &str, output: Value) {
        // 같은 ID의 trace-create는 기존 트레이스에 병합된다
        self.push(IngestionEvent::new(
            "trace-create",
            json!({ "id": trace_id, "output": output }),
        ));
    }

    async fn flush(&self) -> Result<(), CoreError> {
        let batch = std::mem::take(&mut *self.buffer.lock());
        if batch.is_empty() {
            return Ok(());
        }
        debug!("트레이스 배치 전송: {}건", batch.len());

        let result = async {
            let resp = self
                .client
                .post(format!("{}{INGESTION_PATH}", self.host))
                .basic_auth(&self.public_key, Some(&self.secret_key))
                .json(&json!({ "batch": batch }))
                .send()
                .await
                .map_err(|e| transport_error("트레이스 전송", e))?;
            check_response(resp, "Ingestion").await.map(|_| ())
        }
        .await;

        if result.is_err() {
            // 실패한 배치는 다음 flush 때 먼저 보낸다
            let mut buffer = self.buffer.lock();
            let newer = std::mem::replace(&mut *buffer, batch);
            buffer.extend(newer);
        }
        result
    }
}

/// 관측성 비활성 시 사용하는 수집기
#[derive(Debug, Default)]
pub struct NoOpTraceCollector;

#[async_trait]
impl TraceCollector for NoOpTraceCollector {
    fn start_trace(&self, _trace: NewTrace) -> String {
        Uuid::new_v4().to_string()
    }

    fn start_span(&self, _trace_id: &str, _span: NewSpan) -> String {
        Uuid::new_v4().to_string()
    }

    fn end_span(&self, _trace_id: &str, _span_id: &str, _end: SpanEnd) {}

    fn update_trace(&self, _trace_id: &str, _output: Value) {}

    async fn flush(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// 설정에 맞는 수집기 선택
pub fn collector_from_config(
    config: &ObservabilityConfig,
    timeout: Duration,
) -> Result<std::sync::Arc<dyn TraceCollector>, CoreError> {
    if !config.enabled {
        info!("관측성 비활성, no-op 수집기 사용");
        return Ok(std::sync::Arc::new(NoOpTraceCollector));
    }
    info!("관측성 수집기: {}", config.host);
    Ok(std::sync::Arc::new(HttpTraceCollector::from_config(
        config, timeout,
    )?))
}
