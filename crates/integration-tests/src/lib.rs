//! Integration tests for the Madstore storefront.
//!
//! Each test serves the full storefront router on an ephemeral port, with
//! in-memory sessions and an `httpmock` server standing in for the Madstore
//! REST API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p madstore-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};

use httpmock::MockServer;
use madstore_storefront::config::{GoogleConfig, StorefrontConfig};
use madstore_storefront::middleware::create_session_layer;
use madstore_storefront::routes;
use madstore_storefront::state::AppState;
use reqwest::{Client, Response, redirect::Policy};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;

/// A running storefront and the mock API behind it.
pub struct TestContext {
    /// Browser-like client: keeps cookies, does not follow redirects.
    pub client: Client,
    pub storefront_url: String,
    pub api: MockServer,
}

/// Storefront configuration pointing at the mock API.
#[must_use]
pub fn test_config(api_base_url: String) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        api_base_url,
        google: GoogleConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

impl TestContext {
    /// Start the mock API and serve the storefront against it.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or the client cannot be built.
    pub async fn new() -> Self {
        let api = MockServer::start_async().await;
        let config = test_config(api.url("/"));
        let sessions = create_session_layer(MemoryStore::default(), &config);
        let app = routes::app(AppState::new(config, None), sessions);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            storefront_url: format!("http://{addr}"),
            api,
        }
    }

    /// Absolute storefront URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET a storefront page.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET")
    }

    /// POST a form to the storefront.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to send POST")
    }
}

/// The `Location` header of a redirect response.
///
/// # Panics
///
/// Panics if the response is not a redirect.
#[must_use]
pub fn location(response: &Response) -> String {
    assert!(
        response.status().is_redirection(),
        "expected a redirect, got {}",
        response.status()
    );
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("Redirect without Location")
        .to_string()
}
