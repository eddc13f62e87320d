//! Resilient AI Provider - Wrapper adding a time budget and bounded retry.
//!
//! Every attempt runs under `tokio::time::timeout`. Retryable failures (rate
//! limit, unavailable, network, timeout) are retried with exponential backoff
//! until `max_attempts` is reached; anything else is returned immediately.
//!
//! # Example
//!
//! ```ignore
//! let provider = ResilientProvider::new(GeminiProvider::new(gemini_config))
//!     .with_timeout(Duration::from_secs(60))
//!     .with_max_attempts(2);
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// Default time budget per attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// AI provider wrapper with a per-attempt timeout and bounded retry.
pub struct ResilientProvider<P: AIProvider> {
    inner: P,
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
}

impl<P: AIProvider> ResilientProvider<P> {
    /// Wraps `inner` with the default 60s timeout and 2 attempts.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_secs(1),
        }
    }

    /// Sets the time budget per attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the total number of attempts (at least one).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the delay before the first retry; doubles for each later one.
    pub fn with_base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    async fn attempt(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        match timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(AIError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl<P: AIProvider> AIProvider for ResilientProvider<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut attempt = 1;
        loop {
            match self.attempt(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.base_backoff * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        responder = %request.metadata.responder,
                        session = %request.metadata.session_key,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Completion failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.inner.provider_info()
    }
}
