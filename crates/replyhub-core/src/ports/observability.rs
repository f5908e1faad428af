//! 관측성 포트.
//!
//! 구현: `replyhub-network` crate (HTTP 수집기, no-op)
//!
//! 트레이스/스팬 생성은 로컬 버퍼링이라 동기이고, `flush`만 원격 호출이다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::trace::{NewSpan, NewTrace, SpanEnd};

/// 트레이스 수집기
#[async_trait]
pub trait TraceCollector: Send + Sync {
    /// 트레이스 시작, 트레이스 ID 반환
    fn start_trace(&self, trace: NewTrace) -> String;

    /// 트레이스 하위 스팬 시작, 스팬 ID 반환
    fn start_span(&self, trace_id: &str, span: NewSpan) -> String;

    /// 스팬 종료
    fn end_span(&self, trace_id: &str, span_id: &str, end: SpanEnd);

    /// 트레이스 출력 갱신
    fn update_trace(&self, trace_id: &str, output: serde_json::Value);

    /// 버퍼된 관측 데이터를 백엔드로 전송
    async fn flush(&self) -> Result<(), CoreError>;
}
