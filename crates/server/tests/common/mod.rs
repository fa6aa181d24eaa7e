//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `litlens-server`
//! integration tests. `TestApp` spawns the real router on a random port, backed
//! either by a scripted `MockAiProvider` or by a `GeminiProvider` pointed at an
//! `httpmock::MockServer`.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use litlens::VerificationPolicy;
use litlens_server::{
    config::AppConfig,
    router,
    state::{build_app_state, build_app_state_with_provider, AppState},
};
use litlens_test_utils::{fake_jpeg, MockAiProvider};
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use std::net::SocketAddr;
use tokio::{net::TcpListener, task::JoinHandle};

/// The path the fake Gemini endpoint is served on.
pub const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash-lite:generateContent";

/// The key the harness configures; the fake Gemini endpoint expects it.
pub const TEST_API_KEY: &str = "test-key";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub app_state: AppState,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with a scripted in-process gateway.
    pub async fn spawn_with_mock(
        mock: &MockAiProvider,
        policy: VerificationPolicy,
    ) -> Result<Self> {
        let config = AppConfig {
            verification: policy,
            ..test_config()
        };
        Self::spawn_with_config(mock, config).await
    }

    /// Spawns the server around `mock` with a caller-built configuration.
    pub async fn spawn_with_config(mock: &MockAiProvider, config: AppConfig) -> Result<Self> {
        let app_state = build_app_state_with_provider(config, Box::new(mock.clone()))?;
        Self::spawn_with_state(app_state).await
    }

    /// Spawns the server with the real Gemini provider aimed at `mock_server`.
    pub async fn spawn_with_gemini(
        mock_server: &MockServer,
        policy: VerificationPolicy,
    ) -> Result<Self> {
        let config = AppConfig {
            gemini_api_key: Some(TEST_API_KEY.to_string()),
            ai_api_url: Some(mock_server.url(GEMINI_PATH)),
            verification: policy,
            ..AppConfig::default()
        };
        let app_state = build_app_state(config).await?;
        Self::spawn_with_state(app_state).await
    }

    pub async fn spawn_with_state(app_state: AppState) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            app_state: app_state_for_harness,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Posts a multipart form to `/api/processphoto`.
    pub async fn post_form(&self, form: Form) -> Result<Response> {
        Ok(self
            .client
            .post(format!("{}/api/processphoto", self.address))
            .multipart(form)
            .send()
            .await?)
    }

    /// Posts `fake_jpeg()` as the `image` file part.
    pub async fn post_photo(&self) -> Result<Response> {
        self.post_form(image_form(fake_jpeg(), "image/jpeg")?).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// The configuration every harness starts from.
pub fn test_config() -> AppConfig {
    AppConfig {
        gemini_api_key: Some(TEST_API_KEY.to_string()),
        ..AppConfig::default()
    }
}

/// A form holding one `image` file part.
pub fn image_form(bytes: Vec<u8>, mime_type: &str) -> Result<Form> {
    let part = Part::bytes(bytes).file_name("shelf.jpg").mime_str(mime_type)?;
    Ok(Form::new().part("image", part))
}
