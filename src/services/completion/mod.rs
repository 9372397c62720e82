//! Text completion with bounded retry
//!
//! [`CompletionClient`] is a single upstream call; [`CompletionGateway`] wraps
//! one with linear backoff so callers see either text or a single
//! [`AppError::Upstream`].

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub mod groq;

pub use groq::GroqClient;

/// Default number of attempts per completion
pub const MAX_ATTEMPTS: u32 = 3;

/// Default backoff unit; retry `k` waits `k * BASE_DELAY`
pub const BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f32,
}

/// One attempt at a text completion
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct CompletionGateway {
    client: Arc<dyn CompletionClient>,
    max_attempts: u32,
    base_delay: Duration,
}

impl CompletionGateway {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_retry(client, MAX_ATTEMPTS, BASE_DELAY)
    }

    pub fn with_retry(client: Arc<dyn CompletionClient>, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Runs a completion, retrying any failure up to the attempt limit
    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f32,
    ) -> AppResult<String> {
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            system_prompt: system_prompt.map(str::to_string),
            temperature,
        };

        let mut attempt = 1;
        loop {
            match self.client.complete(&request).await {
                Ok(text) => {
                    tracing::debug!(
                        provider = self.client.name(),
                        attempt,
                        chars = text.len(),
                        "Completion succeeded"
                    );
                    return Ok(text);
                }
                Err(e) if attempt >= self.max_attempts => {
                    tracing::error!(
                        provider = self.client.name(),
                        attempts = attempt,
                        error = %e,
                        "Completion failed, giving up"
                    );
                    return Err(AppError::Upstream {
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    let delay = self.delay_before_retry(attempt);
                    tracing::warn!(
                        provider = self.client.name(),
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %e,
                        "Completion failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Linear backoff: the k-th retry waits `k * base_delay`
    fn delay_before_retry(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }
}
