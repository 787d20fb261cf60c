//! Mock translator for tests and local development
//!
//! Deterministic and API-free. Selected at runtime with `TRANSLATOR=mock`.
//!
//! # Example
//!
//! ```ignore
//! let mock = MockTranslator::suffix().fail_language("bn");
//! // "What is X?" -> hi => "What is X? [hi]", -> bn => Err(Backend)
//! ```

use crate::i18n::LanguageCode;
use crate::translation::{TranslationError, Translator};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translator with configurable output and failure injection.
#[derive(Debug, Default)]
pub struct MockTranslator {
    /// Fixed outputs keyed by (source text, target code); others get a suffix
    mappings: HashMap<(String, String), String>,
    /// Every call fails with this message when set
    always_fail: Option<String>,
    /// Target languages whose calls fail
    failing_languages: HashSet<String>,
    /// Source texts whose calls fail
    failing_texts: HashSet<String>,
    /// Simulated network latency
    delay: Duration,
    calls: AtomicUsize,
}

impl MockTranslator {
    /// Translate by appending the target code: `"hello"` -> `"hello [hi]"`.
    pub fn suffix() -> Self {
        Self::default()
    }

    /// Fail every call with a `Backend` error.
    pub fn failing(message: &str) -> Self {
        Self {
            always_fail: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Return `translation` for `text` into `target`.
    pub fn with_mapping(mut self, text: &str, target: &str, translation: &str) -> Self {
        self.mappings
            .insert((text.to_string(), target.to_string()), translation.to_string());
        self
    }

    /// Fail all calls targeting `target`.
    pub fn fail_language(mut self, target: &str) -> Self {
        self.failing_languages.insert(target.to_string());
        self
    }

    /// Fail all calls whose source text is `text`.
    pub fn fail_text(mut self, text: &str) -> Self {
        self.failing_texts.insert(text.to_string());
        self
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `translate` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(message) = &self.always_fail {
            return Err(TranslationError::Backend(message.clone()));
        }
        if self.failing_languages.contains(target.as_str()) {
            return Err(TranslationError::Backend(format!(
                "unsupported language pair for {}",
                target
            )));
        }
        if self.failing_texts.contains(text) {
            return Err(TranslationError::Backend("text rejected".to_string()));
        }

        let key = (text.to_string(), target.as_str().to_string());
        Ok(self
            .mappings
            .get(&key)
            .cloned()
            .unwrap_or_else(|| format!("{} [{}]", text, target)))
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
