//! Translation fill policy.
//!
//! Given a record, translate the original into every supported language
//! that has no slot yet. Policy is all-or-nothing per language: a slot is
//! produced only when both the question and the answer translate. A failed
//! language stays absent; fill never leaves a half-translated slot behind
//! and never retries on its own (the gateway's bounded backoff is the only
//! retry).

use crate::i18n::{LanguageCode, Languages};
use crate::model::{Faq, FaqContent};
use crate::translation::{TranslationError, TranslatorGateway};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one fill pass over a record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FillOutcome {
    /// New slots, ready to persist
    pub filled: BTreeMap<LanguageCode, FaqContent>,
    /// Languages that stayed absent, with the first error seen
    pub failed: Vec<(LanguageCode, TranslationError)>,
}

impl FillOutcome {
    /// True when the record had no missing languages.
    pub fn is_noop(&self) -> bool {
        self.filled.is_empty() && self.failed.is_empty()
    }
}

/// Computes missing translations through the gateway.
#[derive(Clone)]
pub struct FillPolicy {
    gateway: TranslatorGateway,
    languages: Arc<Languages>,
}

impl FillPolicy {
    pub fn new(gateway: TranslatorGateway, languages: Arc<Languages>) -> Self {
        Self { gateway, languages }
    }

    pub fn languages(&self) -> &Languages {
        &self.languages
    }

    /// Translate every missing language of `faq`.
    ///
    /// All languages, and the question/answer pair within a language, are
    /// translated concurrently. Returns once every call has finished.
    /// A record with no missing languages makes no gateway calls.
    pub async fn fill(&self, faq: &Faq) -> FillOutcome {
        let missing = faq.missing_languages(&self.languages);
        if missing.is_empty() {
            return FillOutcome::default();
        }

        let results = join_all(
            missing
                .into_iter()
                .map(|lang| async move { (lang.clone(), self.fill_language(faq, lang).await) }),
        )
        .await;

        let mut outcome = FillOutcome::default();
        for (lang, result) in results {
            match result {
                Ok(content) => {
                    outcome.filled.insert(lang, content);
                }
                Err(e) => {
                    warn!("FAQ {}: leaving '{}' untranslated: {}", faq.id, lang, e);
                    outcome.failed.push((lang, e));
                }
            }
        }

        info!(
            "FAQ {}: filled {} language(s), {} failed",
            faq.id,
            outcome.filled.len(),
            outcome.failed.len()
        );
        outcome
    }

    async fn fill_language(
        &self,
        faq: &Faq,
        lang: &LanguageCode,
    ) -> Result<FaqContent, TranslationError> {
        let (question, answer) = tokio::join!(
            self.gateway.translate(&faq.original.question, lang),
            self.gateway.translate(&faq.original.answer, lang),
        );

        Ok(FaqContent {
            question: question?,
            answer: answer?,
        })
    }
}
