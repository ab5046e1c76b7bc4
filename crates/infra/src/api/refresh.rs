//! HTTP refresh exchange

use async_trait::async_trait;
use marketlink_core::{build_headers, normalize, TokenExchange};
use marketlink_domain::{
    ErrorKind, ErrorRecord, HttpMethod, RefreshRequest, RefreshedTokens, RequestBody,
};
use tracing::{debug, instrument};

use crate::http::{HttpClient, TransportRequest};

/// POSTs `{ refresh }` to the refresh endpoint and expects
/// `{ access, refresh? }` back.
///
/// The exchange is a single unauthenticated attempt; it is never retried.
#[derive(Debug, Clone)]
pub struct HttpTokenExchange {
    http: HttpClient,
    url: String,
}

impl HttpTokenExchange {
    /// Exchange posting to the absolute refresh `url`.
    pub fn new(http: HttpClient, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl TokenExchange for HttpTokenExchange {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn exchange(&self, refresh_token: &str) -> Result<RefreshedTokens, ErrorRecord> {
        let body = RequestBody::json(&RefreshRequest { refresh: refresh_token.to_string() })?;
        let headers = build_headers(false, &body, None);

        let raw = self
            .http
            .send(TransportRequest { method: HttpMethod::Post, url: &self.url, headers: &headers, body: &body })
            .await?;
        let envelope = normalize(&raw).map_err(|err| err.with_kind(ErrorKind::AuthFailed))?;

        let data = envelope.data.ok_or_else(|| {
            ErrorRecord::from_response(envelope.status, "Refresh response was empty", Default::default())
                .with_kind(ErrorKind::AuthFailed)
        })?;
        let tokens: RefreshedTokens = serde_json::from_value(data).map_err(|err| {
            ErrorRecord::from_response(
                envelope.status,
                format!("Refresh response is missing an access token: {err}"),
                Default::default(),
            )
            .with_kind(ErrorKind::AuthFailed)
        })?;

        debug!(rotated = tokens.refresh.is_some(), "Refresh exchange succeeded");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn exchange_for(server: &MockServer) -> HttpTokenExchange {
        let http = HttpClient::builder().timeout(Duration::from_secs(5)).build().unwrap();
        HttpTokenExchange::new(http, format!("{}/api/auth/token/refresh/", server.uri()))
    }

    #[tokio::test]
    async fn test_exchange_posts_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/token/refresh/"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"refresh": "r1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a2"})))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = exchange_for(&server).exchange("r1").await.unwrap();
        assert_eq!(tokens.access, "a2");
        assert!(tokens.refresh.is_none());
    }

    #[tokio::test]
    async fn test_rejected_refresh_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is blacklisted"})),
            )
            .mount(&server)
            .await;

        let err = exchange_for(&server).exchange("r1").await.unwrap_err();
        assert_eq!(err.status, 401);
        assert_eq!(err.kind, ErrorKind::AuthFailed);
        assert_eq!(err.message, "Token is blacklisted");
    }

    #[tokio::test]
    async fn test_success_without_access_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"refresh": "r2"})))
            .mount(&server)
            .await;

        let err = exchange_for(&server).exchange("r1").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthFailed);
    }
}
