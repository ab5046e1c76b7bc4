//! Request Executor
//!
//! Owns the lifecycle of every call: header building, the cancellation
//! guard, normalization, transient-failure retries and the single
//! refresh-and-replay on 401.

use std::sync::Arc;

use marketlink_common::{EventBus, RetryConfig, RetryPolicy};
use marketlink_core::{
    build_headers, normalize, refresh_applies, AuthFailureHandler, CredentialStore, Navigator,
    RefreshCoordinator, RefreshState, TokenExchange, TransientFailurePolicy,
};
use marketlink_domain::{
    ClientConfig, CredentialKey, ErrorKind, ErrorRecord, HttpMethod, MarketlinkError,
    RequestBody, RequestDescriptor, ResponseEnvelope, SessionEvent,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::refresh::HttpTokenExchange;
use crate::http::{HttpClient, TransportRequest};

/// API client implementing the request lifecycle.
pub struct ApiClient {
    http: HttpClient,
    config: ClientConfig,
    retry: RetryConfig,
    policy: TransientFailurePolicy,
    store: Arc<dyn CredentialStore>,
    refresh: Arc<RefreshCoordinator>,
    events: EventBus<SessionEvent>,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Credential store shared with the session flows.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Bus carrying `auth:login` and `auth:logout`.
    pub fn events(&self) -> &EventBus<SessionEvent> {
        &self.events
    }

    /// Execute a request and return the untyped envelope.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ErrorRecord`] once retries and the refresh
    /// path are exhausted.
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method, path = %descriptor.path))]
    pub async fn execute(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<ResponseEnvelope<Value>, ErrorRecord> {
        let url = self.url_for(&descriptor.path)?;
        let mut descriptor = descriptor;
        let mut refresh_state = RefreshState::Active;

        loop {
            let seen_generation = self.refresh.failure_generation();
            let sent_token = self.access_token(&descriptor).await;
            let error = match self.attempt(&descriptor, &url, sent_token.as_deref()).await {
                Ok(envelope) => {
                    debug!(status = envelope.status, attempt = descriptor.attempt, "Request succeeded");
                    return Ok(envelope);
                }
                Err(error) => error,
            };

            // A replay after refresh is final
            if refresh_state == RefreshState::Replayed {
                warn!(status = error.status, "Replayed request failed");
                return Err(error);
            }

            if refresh_state.can_refresh() && refresh_applies(&error, &descriptor) {
                debug!(state = ?RefreshState::RefreshAttempted, "Access token rejected, refreshing");
                refresh_state = self.refresh.recover(sent_token.as_deref(), seen_generation).await;
                if refresh_state == RefreshState::Replayed {
                    descriptor = descriptor.next_attempt();
                    continue;
                }
                return Err(error.with_kind(ErrorKind::AuthFailed));
            }

            // No refresh can follow this 401
            let error = if error.kind == ErrorKind::AuthExpired {
                error.with_kind(ErrorKind::Client)
            } else {
                error
            };

            let decision = self.policy.should_retry(&error, descriptor.attempt);
            match self.retry.delay_for(&decision, descriptor.attempt) {
                Some(delay) => {
                    warn!(
                        status = error.status,
                        kind = %error.kind,
                        attempt = descriptor.attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    descriptor = descriptor.next_attempt();
                }
                None => {
                    info!(status = error.status, kind = %error.kind, attempt = descriptor.attempt, "Request failed");
                    return Err(error);
                }
            }
        }
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        require_auth: bool,
    ) -> Result<ResponseEnvelope<T>, ErrorRecord> {
        self.send_typed(HttpMethod::Get, path, RequestBody::Empty, require_auth).await
    }

    /// Execute a POST request
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        require_auth: bool,
    ) -> Result<ResponseEnvelope<T>, ErrorRecord> {
        self.send_typed(HttpMethod::Post, path, body.into(), require_auth).await
    }

    /// Execute a PUT request
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        require_auth: bool,
    ) -> Result<ResponseEnvelope<T>, ErrorRecord> {
        self.send_typed(HttpMethod::Put, path, body.into(), require_auth).await
    }

    /// Execute a PATCH request
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        require_auth: bool,
    ) -> Result<ResponseEnvelope<T>, ErrorRecord> {
        self.send_typed(HttpMethod::Patch, path, body.into(), require_auth).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        require_auth: bool,
    ) -> Result<ResponseEnvelope<T>, ErrorRecord> {
        self.send_typed(HttpMethod::Delete, path, RequestBody::Empty, require_auth).await
    }

    async fn send_typed<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
        require_auth: bool,
    ) -> Result<ResponseEnvelope<T>, ErrorRecord> {
        let descriptor =
            RequestDescriptor::new(method, path).with_body(body).with_auth(require_auth);
        let envelope = self.execute(descriptor).await?;

        Ok(envelope.map(|data| match serde_json::from_value(data) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(%method, path, error = %err, "Response body does not match the expected shape");
                None
            }
        }))
    }

    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
        url: &str,
        access_token: Option<&str>,
    ) -> Result<ResponseEnvelope<Value>, ErrorRecord> {
        let headers = build_headers(descriptor.require_auth, &descriptor.body, access_token);
        debug!(attempt = descriptor.attempt, authorized = headers.contains("Authorization"), "Sending request");

        let raw = self
            .http
            .send(TransportRequest {
                method: descriptor.method,
                url,
                headers: &headers,
                body: &descriptor.body,
            })
            .await?;

        normalize(&raw)
    }

    async fn access_token(&self, descriptor: &RequestDescriptor) -> Option<String> {
        if !descriptor.require_auth {
            return None;
        }
        match self.store.get(CredentialKey::AccessToken).await {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(err) => {
                warn!(error = %err, "Failed to read access token");
                None
            }
        }
    }

    fn url_for(&self, path: &str) -> Result<String, ErrorRecord> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        url::Url::parse(&url)
            .map_err(|err| ErrorRecord::internal(format!("Invalid request URL {url}: {err}")))?;
        Ok(url)
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    store: Option<Arc<dyn CredentialStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    exchange: Option<Arc<dyn TokenExchange>>,
    events: Option<EventBus<SessionEvent>>,
}

impl ApiClientBuilder {
    /// Set the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential store
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the navigator driven on auth failure
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the HTTP refresh exchange
    pub fn token_exchange(mut self, exchange: Arc<dyn TokenExchange>) -> Self {
        self.exchange = Some(exchange);
        self
    }

    /// Share an existing event bus
    pub fn events(mut self, events: EventBus<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing, the configuration is
    /// invalid or the HTTP client cannot be created
    pub fn build(self) -> Result<ApiClient, MarketlinkError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let store = self
            .store
            .ok_or_else(|| MarketlinkError::Config("Credential store not set".to_string()))?;
        let navigator =
            self.navigator.ok_or_else(|| MarketlinkError::Config("Navigator not set".to_string()))?;
        let events = self.events.unwrap_or_default();

        let mut http = HttpClient::builder().timeout(config.timeout());
        if let Some(agent) = &config.user_agent {
            http = http.user_agent(agent.clone());
        }
        let http = http.build()?;

        let exchange = match self.exchange {
            Some(exchange) => exchange,
            None => Arc::new(HttpTokenExchange::new(
                http.clone(),
                format!("{}{}", config.base_url.trim_end_matches('/'), config.refresh_endpoint),
            )),
        };

        let failure_handler = Arc::new(AuthFailureHandler::new(
            store.clone(),
            navigator,
            events.clone(),
            config.safe_location.clone(),
        ));
        let refresh = Arc::new(RefreshCoordinator::new(store.clone(), exchange, failure_handler));
        let retry = RetryConfig::linear(config.retry_attempts, config.retry_delay());

        Ok(ApiClient {
            http,
            config,
            retry,
            policy: TransientFailurePolicy,
            store,
            refresh,
            events,
        })
    }
}
