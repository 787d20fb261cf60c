//! Translator gateway: the only path from the service to a translation backend.
//!
//! Backends implement [`Translator`]. The service never calls a backend
//! directly; it goes through [`TranslatorGateway`], which adds:
//!
//! - an empty-input guard (empty text is never sent)
//! - a per-attempt timeout
//! - bounded retries with backoff for transient failures
//! - output validation (logged, never fatal)
//! - call/failure counters
//!
//! The gateway keeps no cache; caching happens at record level (stored
//! translation slots) and response level (`FaqCache`).

mod mock;
mod openai;

pub use mock::MockTranslator;
pub use openai::OpenAiTranslator;

use crate::i18n::{LanguageCode, TranslationValidator};
use crate::metrics::ServiceMetrics;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Failure of a single translation. Always recovered by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    #[error("refusing to translate empty text")]
    EmptyText,

    #[error("translation timed out after {0:?}")]
    Timeout(Duration),

    /// Network failure or unreadable response
    #[error("translation request failed: {0}")]
    Request(String),

    /// Non-success HTTP status from the backend
    #[error("translation API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("translation backend returned no text")]
    EmptyResponse,

    /// Backend refused the request (unsupported pair, quota exhausted, ...)
    #[error("translation backend error: {0}")]
    Backend(String),
}

impl TranslationError {
    /// Determine if an error is worth retrying (timeouts, network errors,
    /// 429 rate limit, 5xx). Other 4xx errors and refusals are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::Timeout(_)
            | TranslationError::Request(_)
            | TranslationError::EmptyResponse => true,
            TranslationError::Api { status, .. } => *status == 429 || *status >= 500,
            TranslationError::EmptyText | TranslationError::Backend(_) => false,
        }
    }
}

/// A translation backend.
///
/// Implementations handle one request; timeouts and retries are applied by
/// [`TranslatorGateway`].
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` into `target`.
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, TranslationError>;

    /// Name of the backend, for logging.
    fn provider_name(&self) -> &str;
}

/// Adapter wrapping a [`Translator`] with the service's error policy.
#[derive(Clone)]
pub struct TranslatorGateway {
    translator: Arc<dyn Translator>,
    source: LanguageCode,
    timeout: Duration,
    retry: RetryConfig,
    metrics: Arc<ServiceMetrics>,
}

impl TranslatorGateway {
    /// Create a gateway translating out of `source`, bounding each backend
    /// attempt by `timeout`.
    ///
    /// The bound is per attempt, not per call: a call that keeps timing out
    /// waits `attempts * timeout` plus the retry backoff before failing
    /// (2.25s for a 500ms timeout under [`RetryConfig::translation`]).
    pub fn new(
        translator: Arc<dyn Translator>,
        source: LanguageCode,
        timeout: Duration,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            translator,
            source,
            timeout,
            retry: RetryConfig::translation(),
            metrics,
        }
    }

    /// Replace the retry policy (tests use [`RetryConfig::no_retry`]).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.translator.provider_name()
    }

    /// Translate `text` into `target`.
    ///
    /// Returns the translated text, or a [`TranslationError`] once the input
    /// is rejected, a non-retryable error occurs, or retries are exhausted.
    pub async fn translate(
        &self,
        text: &str,
        target: &LanguageCode,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyText);
        }

        let operation_name = format!(
            "Translation to {} via {}",
            target,
            self.translator.provider_name()
        );

        let result = with_retry_if(
            &self.retry,
            &operation_name,
            || async {
                self.metrics.record_translation_call();
                match tokio::time::timeout(
                    self.timeout,
                    self.translator.translate(text, &self.source, target),
                )
                .await
                {
                    Ok(Ok(translated)) if translated.trim().is_empty() => {
                        Err(TranslationError::EmptyResponse)
                    }
                    Ok(Ok(translated)) => Ok(translated.trim().to_string()),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(TranslationError::Timeout(self.timeout)),
                }
            },
            TranslationError::is_retryable,
        )
        .await;

        match &result {
            Ok(translated) => {
                let validation = TranslationValidator::validate(text, translated);
                if validation.has_warnings() {
                    warn!(
                        "Translation validation warnings for {}: {:?}",
                        target, validation.warnings
                    );
                }
                debug!("{} succeeded ({} chars)", operation_name, translated.len());
            }
            Err(e) => {
                self.metrics.record_translation_failure();
                warn!("{} failed: {}", operation_name, e);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> LanguageCode {
        LanguageCode::parse(s).unwrap()
    }

    fn gateway(mock: Arc<MockTranslator>, timeout: Duration) -> (TranslatorGateway, Arc<ServiceMetrics>) {
        let metrics = Arc::new(ServiceMetrics::new());
        let gateway = TranslatorGateway::new(mock, code("en"), timeout, metrics.clone())
            .with_retry(RetryConfig::no_retry());
        (gateway, metrics)
    }

    // ==================== is_retryable Tests ====================

    #[test]
    fn test_is_retryable_transient_errors() {
        assert!(TranslationError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(TranslationError::Request("connection refused".into()).is_retryable());
        assert!(TranslationError::EmptyResponse.is_retryable());
        assert!(TranslationError::Api { status: 429, body: String::new() }.is_retryable());
        assert!(TranslationError::Api { status: 503, body: String::new() }.is_retryable());
    }

    #[test]
    fn test_is_retryable_final_errors() {
        assert!(!TranslationError::EmptyText.is_retryable());
        assert!(!TranslationError::Backend("unsupported pair".into()).is_retryable());
        assert!(!TranslationError::Api { status: 400, body: String::new() }.is_retryable());
        assert!(!TranslationError::Api { status: 401, body: String::new() }.is_retryable());
    }

    // ==================== Gateway Tests ====================

    #[tokio::test]
    async fn test_gateway_translates() {
        let mock = Arc::new(MockTranslator::suffix());
        let (gateway, metrics) = gateway(mock.clone(), Duration::from_secs(1));

        let result = gateway.translate("What is X?", &code("hi")).await;

        assert_eq!(result.unwrap(), "What is X? [hi]");
        assert_eq!(mock.calls(), 1);
        assert_eq!(metrics.translation_calls(), 1);
        assert_eq!(metrics.translation_failures(), 0);
    }

    #[tokio::test]
    async fn test_gateway_rejects_empty_text_without_calling_backend() {
        let mock = Arc::new(MockTranslator::suffix());
        let (gateway, _) = gateway(mock.clone(), Duration::from_secs(1));

        assert_eq!(gateway.translate("", &code("hi")).await, Err(TranslationError::EmptyText));
        assert_eq!(gateway.translate("   \n", &code("hi")).await, Err(TranslationError::EmptyText));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_times_out() {
        let mock = Arc::new(MockTranslator::suffix().with_delay(Duration::from_secs(30)));
        let (gateway, metrics) = gateway(mock, Duration::from_millis(100));

        let result = gateway.translate("What is X?", &code("hi")).await;

        assert_eq!(result, Err(TranslationError::Timeout(Duration::from_millis(100))));
        assert_eq!(metrics.translation_failures(), 1);
    }

    #[tokio::test]
    async fn test_gateway_backend_failure_is_returned() {
        let mock = Arc::new(MockTranslator::failing("quota exceeded"));
        let (gateway, metrics) = gateway(mock, Duration::from_secs(1));

        let result = gateway.translate("What is X?", &code("hi")).await;

        assert!(matches!(result, Err(TranslationError::Backend(msg)) if msg.contains("quota")));
        assert_eq!(metrics.translation_failures(), 1);
    }

    #[tokio::test]
    async fn test_gateway_empty_backend_output_is_an_error() {
        let mock = Arc::new(MockTranslator::suffix().with_mapping("What is X?", "hi", "  "));
        let (gateway, _) = gateway(mock, Duration::from_secs(1));

        let result = gateway.translate("What is X?", &code("hi")).await;
        assert_eq!(result, Err(TranslationError::EmptyResponse));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_retries_timeouts_with_default_policy() {
        let mock = Arc::new(MockTranslator::suffix().with_delay(Duration::from_secs(30)));
        let metrics = Arc::new(ServiceMetrics::new());
        let gateway = TranslatorGateway::new(
            mock.clone(),
            code("en"),
            Duration::from_millis(100),
            metrics.clone(),
        );

        let result = gateway.translate("What is X?", &code("hi")).await;

        assert!(matches!(result, Err(TranslationError::Timeout(_))));
        // translation() preset: 3 attempts
        assert_eq!(mock.calls(), 3);
        assert_eq!(metrics.translation_calls(), 3);
        assert_eq!(metrics.translation_failures(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_timeout_applies_per_attempt() {
        let mock = Arc::new(MockTranslator::suffix().with_delay(Duration::from_secs(30)));
        let metrics = Arc::new(ServiceMetrics::new());
        let gateway = TranslatorGateway::new(
            mock.clone(),
            code("en"),
            Duration::from_millis(500),
            metrics,
        );
        let start = tokio::time::Instant::now();

        let result = gateway.translate("What is X?", &code("hi")).await;

        assert_eq!(result, Err(TranslationError::Timeout(Duration::from_millis(500))));
        // 3 x 500ms attempts + 250ms + 500ms of backoff
        assert_eq!(start.elapsed(), Duration::from_millis(2250));
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_gateway_does_not_retry_backend_refusal() {
        let mock = Arc::new(MockTranslator::suffix().fail_language("bn"));
        let metrics = Arc::new(ServiceMetrics::new());
        let gateway = TranslatorGateway::new(mock.clone(), code("en"), Duration::from_secs(1), metrics);

        assert!(gateway.translate("What is X?", &code("bn")).await.is_err());
        assert_eq!(mock.calls(), 1);
    }
}
