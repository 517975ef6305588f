use super::IngressTransport;
use super::wire::{ErrorResponse, SessionResponse, TestcasesRequest};
use crate::domain::{ReporterError, SessionRequest, TestcaseRequest};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, ClientBuilder, Response};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
    pub enable_compression: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            user_agent: format!("greener-reporter/{}", env!("CARGO_PKG_VERSION")),
            enable_compression: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
}

#[derive(Debug)]
pub struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time: AtomicU64,
}

impl ClientStats {
    fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            total_response_time: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self, success: bool, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ConnectionStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_response_time = self.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if total_requests > 0 {
            Duration::from_millis(total_response_time / total_requests)
        } else {
            Duration::ZERO
        };

        ConnectionStats {
            total_requests,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            average_response_time,
        }
    }
}

/// HTTP/JSON client for the Greener ingress API.
#[derive(Debug, Clone)]
pub struct IngressClient {
    client: Client,
    config: ClientConfig,
    sessions_url: Url,
    testcases_url: Url,
    stats: Arc<ClientStats>,
}

impl IngressClient {
    pub fn new(config: ClientConfig) -> Result<Self, ReporterError> {
        if config.endpoint.is_empty() {
            return Err(ReporterError::InvalidArgument(
                "endpoint cannot be empty".to_string(),
            ));
        }
        if config.api_key.is_empty() {
            return Err(ReporterError::InvalidArgument(
                "api_key cannot be empty".to_string(),
            ));
        }

        let endpoint_url: Url = config.endpoint.parse().map_err(|e| {
            ReporterError::InvalidArgument(format!(
                "invalid endpoint URL '{}': {}",
                config.endpoint, e
            ))
        })?;

        let sessions_url = ingress_url(&endpoint_url, "sessions");
        let testcases_url = ingress_url(&endpoint_url, "testcases");

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent)
            .gzip(config.enable_compression)
            .build()
            .map_err(|e| ReporterError::Unknown(format!("error building HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            sessions_url,
            testcases_url,
            stats: Arc::new(ClientStats::new()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn sessions_url(&self) -> &Url {
        &self.sessions_url
    }

    pub fn testcases_url(&self) -> &Url {
        &self.testcases_url
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        self.stats.snapshot()
    }

    /// Posts `body` as JSON and turns a non-2xx answer into an ingress error.
    /// `kind` names the request in error messages ("session", "testcase").
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        kind: &str,
    ) -> Result<Response, ReporterError> {
        let start = Instant::now();

        let result = self
            .client
            .post(url.clone())
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_request(false, start.elapsed());
                warn!("Failed to send {} request to {}: {}", kind, url, e);
                return Err(ReporterError::Unknown(format!(
                    "error sending {kind} request: {e}"
                )));
            }
        };

        let status = response.status();
        self.stats
            .record_request(status.is_success(), start.elapsed());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = ErrorResponse::message_from_body(&body);
        warn!(
            "Ingress rejected {} request: HTTP {} {}",
            kind,
            status.as_u16(),
            message
        );

        Err(ReporterError::Ingress {
            status: status.as_u16(),
            message: format!("failed {kind} request: {message}"),
        })
    }
}

impl IngressTransport for IngressClient {
    async fn create_session(&self, session: SessionRequest) -> Result<String, ReporterError> {
        let response = self
            .post_json(&self.sessions_url, &session, "session")
            .await?;

        let session = response.json::<SessionResponse>().await.map_err(|e| {
            ReporterError::Unknown(format!("error parsing session response: {e}"))
        })?;

        debug!("Created session {}", session.id);
        Ok(session.id)
    }

    async fn send_testcases(&self, testcases: Vec<TestcaseRequest>) -> Result<(), ReporterError> {
        let count = testcases.len();
        self.post_json(
            &self.testcases_url,
            &TestcasesRequest { testcases },
            "testcase",
        )
        .await?;

        debug!("Delivered {} testcases", count);
        Ok(())
    }
}

/// Appends `/api/v1/ingress/<resource>` to the endpoint, keeping any path prefix.
fn ingress_url(endpoint: &Url, resource: &str) -> Url {
    let mut url = endpoint.clone();
    let prefix = endpoint.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}/api/v1/ingress/{resource}"));
    url
}
