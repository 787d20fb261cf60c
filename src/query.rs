//! Read path: language resolution, fallback projection and cached listing.

use crate::cache::FaqCache;
use crate::error::StoreError;
use crate::i18n::{LanguageCode, Languages};
use crate::model::{Faq, FaqView, Field};
use crate::store::ContentStore;
use std::sync::Arc;
use tracing::debug;

/// Text of `field` in `lang`, falling back to the original.
///
/// Falls back when `lang` is the original language, is not supported, or
/// its slot is absent or blank. Never returns an empty string for a record
/// whose original field is non-empty.
pub fn resolve<'a>(faq: &'a Faq, field: Field, lang: &LanguageCode) -> &'a str {
    faq.translation(lang)
        .map(|content| content.get(field))
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| faq.original.get(field))
}

/// Project a record into its `{question, answer}` shape for `lang`.
pub fn project(faq: &Faq, lang: &LanguageCode) -> FaqView {
    FaqView {
        question: resolve(faq, Field::Question, lang).to_string(),
        answer: resolve(faq, Field::Answer, lang).to_string(),
    }
}

/// Serves `GET /faqs` through the cache.
#[derive(Clone)]
pub struct FaqQuery {
    store: ContentStore,
    cache: Arc<FaqCache>,
    languages: Arc<Languages>,
}

impl FaqQuery {
    pub fn new(store: ContentStore, cache: Arc<FaqCache>, languages: Arc<Languages>) -> Self {
        Self {
            store,
            cache,
            languages,
        }
    }

    /// List every record projected into the requested language.
    ///
    /// Omitted, malformed or unsupported codes resolve to the original
    /// language, so the cache holds at most one entry per served language.
    pub async fn list(&self, lang: Option<&str>) -> Result<Arc<Vec<FaqView>>, StoreError> {
        let lang = self.languages.resolve_request(lang);

        self.cache
            .get_or_populate(&lang, || async {
                debug!("Populating FAQ list for '{}'", lang);
                let faqs = self.store.list().await?;
                Ok::<_, StoreError>(faqs.iter().map(|faq| project(faq, &lang)).collect())
            })
            .await
    }
}
