//! 애플리케이션 설정 구조체.
//!
//! 백엔드 URL/키, 관측성 수집기, 제안 생성 서비스, 피드백 처리 설정 등
//! 런타임 설정을 정의한다. `ConfigManager`를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 백엔드 연결 설정
    pub server: ServerConfig,
    /// 관측성(트레이스) 설정
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// 제안 생성 서비스 설정
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// 피드백/변경 피드 처리 설정
    #[serde(default)]
    pub feedback: FeedbackConfig,
    /// 에이전트 신원 설정
    #[serde(default)]
    pub agent: AgentConfig,
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:54321".to_string(),
                api_key: None,
                request_timeout_ms: default_request_timeout_ms(),
            },
            observability: ObservabilityConfig::default(),
            generator: GeneratorConfig::default(),
            feedback: FeedbackConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

/// 백엔드 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 백엔드 기본 URL (예: "https://project.example.co")
    pub base_url: String,
    /// API 키 (apikey + Bearer 헤더)
    #[serde(default)]
    pub api_key: Option<String>,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// ============================================================
// 관측성 설정
// ============================================================

/// 트레이스 수집기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// 트레이스 전송 활성화 (false면 no-op 수집기)
    #[serde(default)]
    pub enabled: bool,
    /// 수집기 호스트
    #[serde(default = "default_observability_host")]
    pub host: String,
    /// 공개 키 (basic auth 사용자)
    #[serde(default)]
    pub public_key: Option<String>,
    /// 비밀 키 (basic auth 비밀번호)
    #[serde(default)]
    pub secret_key: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_observability_host(),
            public_key: None,
            secret_key: None,
        }
    }
}

// ============================================================
// 제안 생성 설정
// ============================================================

/// 제안 생성 서비스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// 백엔드 기준 함수 경로
    #[serde(default = "default_generator_path")]
    pub path: String,
    /// 생성 요청 타임아웃 (밀리초). LLM 호출이라 일반 요청보다 길다.
    #[serde(default = "default_generator_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            path: default_generator_path(),
            timeout_ms: default_generator_timeout_ms(),
        }
    }
}

// ============================================================
// 피드백 처리 설정
// ============================================================

/// 피드백/변경 피드 처리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// 신원 미확인 시 1회 재시도 전 대기 (밀리초)
    #[serde(default = "default_identity_retry_delay_ms")]
    pub identity_retry_delay_ms: u64,
    /// 변경 피드 채널 버퍼 크기
    #[serde(default = "default_change_buffer")]
    pub change_buffer: usize,
}

impl FeedbackConfig {
    pub fn identity_retry_delay(&self) -> Duration {
        Duration::from_millis(self.identity_retry_delay_ms)
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            identity_retry_delay_ms: default_identity_retry_delay_ms(),
            change_buffer: default_change_buffer(),
        }
    }
}

/// 에이전트 신원 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// 고정 에이전트 ID (None이면 백엔드 인증 사용자 조회)
    #[serde(default)]
    pub agent_id: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_observability_host() -> String {
    "https://cloud.langfuse.com".to_string()
}

fn default_generator_path() -> String {
    "/functions/v1/generate-suggestion".to_string()
}

fn default_generator_timeout_ms() -> u64 {
    120_000
}

fn default_identity_retry_delay_ms() -> u64 {
    500
}

fn default_change_buffer() -> usize {
    64
}
