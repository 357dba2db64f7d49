use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::types::{TaskRequest, TaskResponse};
use crate::config::{GatewayConfig, RequestConfig};
use crate::error::{GatewayError, GatewayResult};

/// Contract the engine consumes for all generation work.
///
/// Implementations must be cheap to share across tasks; the orchestrator
/// clones an `Arc<dyn ReasoningService>` into every concurrent call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Run one generation task and return the raw structured completion.
    async fn invoke(&self, request: TaskRequest) -> GatewayResult<TaskResponse>;
}

/// HTTP client for the reasoning service pipe API.
#[derive(Clone)]
pub struct HttpReasoningService {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl HttpReasoningService {
    /// Create a new reasoning service client
    pub fn new(config: &GatewayConfig, request_config: RequestConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a single request (internal)
    async fn execute_request(
        &self,
        url: &str,
        request: &TaskRequest,
    ) -> GatewayResult<TaskResponse> {
        debug!(
            task = %request.kind,
            pipe = %request.name,
            messages = request.messages.len(),
            "Calling reasoning service"
        );

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    GatewayError::Http(e)
                }
            })?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after_ms = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            return Err(GatewayError::RateLimited { retry_after_ms });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Unavailable {
                status: Some(status.as_u16()),
                message: error_body,
            });
        }

        let task_response: TaskResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::MalformedResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        Ok(task_response)
    }

    /// Backoff delay before retry `n` (1-based), honoring a rate-limit hint.
    fn retry_delay(&self, retry: u32, last_error: &GatewayError) -> Duration {
        let backoff =
            Duration::from_millis(self.request_config.retry_delay_ms * (2_u64.pow(retry - 1)));
        match last_error {
            GatewayError::RateLimited {
                retry_after_ms: Some(ms),
            } => backoff.max(Duration::from_millis(*ms)),
            _ => backoff,
        }
    }
}

#[async_trait]
impl ReasoningService for HttpReasoningService {
    async fn invoke(&self, request: TaskRequest) -> GatewayResult<TaskResponse> {
        let url = format!("{}/v1/pipes/run", self.base_url);

        let mut last_error: Option<GatewayError> = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                // last_error is always set before a retry iteration
                let delay = self.retry_delay(
                    retries,
                    last_error.as_ref().unwrap_or(&GatewayError::Unavailable {
                        status: None,
                        message: String::new(),
                    }),
                );
                warn!(
                    task = %request.kind,
                    pipe = %request.name,
                    retry = retries,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying reasoning service request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute_request(&url, &request).await {
                Ok(response) => {
                    let latency = start.elapsed();
                    info!(
                        task = %request.kind,
                        pipe = %request.name,
                        latency_ms = latency.as_millis() as u64,
                        "Reasoning service call succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    let latency = start.elapsed();
                    error!(
                        task = %request.kind,
                        pipe = %request.name,
                        error = %e,
                        latency_ms = latency.as_millis() as u64,
                        retry = retries,
                        "Reasoning service call failed"
                    );
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        // Preserve the taxonomy of the last failure so callers can tell a
        // rate limit from an outage after retries are exhausted.
        Err(match last_error {
            Some(GatewayError::Timeout { timeout_ms }) => GatewayError::Timeout { timeout_ms },
            Some(GatewayError::RateLimited { retry_after_ms }) => {
                GatewayError::RateLimited { retry_after_ms }
            }
            Some(e) => GatewayError::Unavailable {
                status: None,
                message: format!("{} (retries: {})", e, retries),
            },
            None => GatewayError::Unavailable {
                status: None,
                message: format!("Unknown error (retries: {})", retries),
            },
        })
    }
}
