#![allow(dead_code)]

use std::sync::Arc;

use marketlink_core::CredentialStore;
use marketlink_domain::{ClientConfig, CredentialKey};
use marketlink_infra::{ApiClient, InMemoryNavigator, MemoryCredentialStore};
use wiremock::MockServer;

pub const REFRESH_PATH: &str = "/api/auth/token/refresh/";

/// Client wired to a mock server with in-memory session ports.
pub struct TestClient {
    pub client: Arc<ApiClient>,
    pub store: Arc<MemoryCredentialStore>,
    pub navigator: Arc<InMemoryNavigator>,
}

impl TestClient {
    /// Client with a 10ms backoff step and a 2s timeout.
    pub fn new(server: &MockServer) -> Self {
        Self::with_config(ClientConfig {
            base_url: server.uri(),
            timeout_ms: 2_000,
            retry_delay_ms: 10,
            ..ClientConfig::default()
        })
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let store = Arc::new(MemoryCredentialStore::new());
        let navigator = Arc::new(InMemoryNavigator::new("/ads/42"));
        let client = ApiClient::builder()
            .config(config)
            .store(store.clone())
            .navigator(navigator.clone())
            .build()
            .expect("client should build");

        Self { client: Arc::new(client), store, navigator }
    }

    /// Store an access/refresh pair as a login would.
    pub async fn seed_tokens(&self, access: &str, refresh: &str) {
        self.store
            .set_many(vec![
                (CredentialKey::AccessToken, access.to_string()),
                (CredentialKey::RefreshToken, refresh.to_string()),
                (CredentialKey::User, r#"{"id":1,"email":"kim@example.com"}"#.to_string()),
            ])
            .await
            .expect("seed should succeed");
    }

    pub async fn stored(&self, key: CredentialKey) -> Option<String> {
        self.store.get(key).await.expect("store read should succeed")
    }
}

/// A loopback address with nothing listening on it.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("local addr should resolve");
    drop(listener);
    format!("http://{addr}")
}
