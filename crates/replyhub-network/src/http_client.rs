//! REST 백엔드 공통 클라이언트.
//!
//! `apikey` + Bearer 헤더 주입, 상태 코드 → `CoreError` 매핑.
//! 재시도는 하지 않는다. 실패는 호출자에게 그대로 전달된다.

use replyhub_core::config::ServerConfig;
use replyhub_core::error::CoreError;
use std::time::Duration;
use tracing::warn;

/// Retry-After 헤더가 없을 때 기본 대기 (초)
const RETRY_AFTER_DEFAULT_SECS: u64 = 60;

/// REST 클라이언트: 모든 HTTP 어댑터가 공유
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestClient {
    /// 새 클라이언트 생성
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// 서버 설정으로 생성
    pub fn from_config(server: &ServerConfig) -> Result<Self, CoreError> {
        Self::new(
            &server.base_url,
            server.api_key.clone(),
            server.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 인증 헤더가 포함된 요청 빌더
    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.authorized(self.client.request(method, &url))
    }

    /// 쿼리 파라미터를 붙인 요청 빌더. 키와 값은 퍼센트 인코딩된다.
    pub(crate) fn request_with_query(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::RequestBuilder, CoreError> {
        let url = self.url(path, query)?;
        Ok(self.authorized(self.client.request(method, url)))
    }

    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Url, CoreError> {
        let mut url = reqwest::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| CoreError::Config(format!("잘못된 URL ({}{path}): {e}", self.base_url)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("apikey", key).bearer_auth(key),
            None => req,
        }
    }
}

/// 응답 상태 코드 확인 및 에러 매핑
pub(crate) async fn check_response(
    resp: reqwest::Response,
    resource_type: &str,
) -> Result<reqwest::Response, CoreError> {
    let status = resp.status();

    if status.is_success() {
        return Ok(resp);
    }

    let retry_after = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let text = resp.text().await.unwrap_or_else(|e| {
        warn!("응답 본문 읽기 실패: {e}");
        String::new()
    });

    match status.as_u16() {
        401 | 403 => Err(CoreError::Auth(format!("인증 실패 ({status}): {text}"))),
        404 => Err(CoreError::NotFound {
            resource_type: resource_type.to_string(),
            id: text,
        }),
        429 => Err(CoreError::RateLimit {
            retry_after_secs: retry_after.unwrap_or(RETRY_AFTER_DEFAULT_SECS),
        }),
        503 => Err(CoreError::ServiceUnavailable(text)),
        code => Err(CoreError::Remote {
            status: code,
            message: text,
        }),
    }
}

/// 전송 단계 에러 매핑
pub(crate) fn transport_error(action: &str, e: reqwest::Error) -> CoreError {
    CoreError::Network(format!("{action} 실패: {e}"))
}
