//! # replyhub-network
//!
//! REST/SSE 네트워크 어댑터.
//! 원격 저장소(PostgREST 규칙), 변경 피드 SSE 스트림, 트레이스 ingestion,
//! 제안 생성 서비스, 호출자 신원 조회를 `replyhub-core` 포트로 구현한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use replyhub_network::http_client::RestClient;
//! use replyhub_network::repository::RestSuggestionRepository;
//! use replyhub_network::sse_client::SseChangeFeed;
//!
//! let client = RestClient::from_config(&config.server)?;
//! let repo = RestSuggestionRepository::new(client.clone());
//! let feed = SseChangeFeed::new(client);
//! ```

pub mod auth;
pub mod generator_client;
pub mod http_client;
pub mod repository;
pub mod sse_client;
pub mod trace_client;
