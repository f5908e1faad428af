//! 에이전트(호출자) 신원 모델.

use serde::{Deserialize, Serialize};

/// 현재 로그인한 상담 에이전트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// 사용자 ID
    pub id: String,
    /// 이메일 (있으면)
    #[serde(default)]
    pub email: Option<String>,
}
