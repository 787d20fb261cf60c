//! Language configuration: the original language and the supported targets.
//!
//! One instance is built from [`Config`](crate::config::Config) at startup
//! and shared by the fill policy and the query façade.

use crate::i18n::LanguageCode;

/// The original (authoring) language plus every language records are
/// translated into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages {
    original: LanguageCode,
    /// Supported translation targets, deduplicated, never containing `original`
    targets: Vec<LanguageCode>,
}

impl Languages {
    /// Build a language set.
    ///
    /// Duplicates and the original language are dropped from `supported`,
    /// keeping the first-seen order.
    pub fn new(original: LanguageCode, supported: impl IntoIterator<Item = LanguageCode>) -> Self {
        let mut targets: Vec<LanguageCode> = Vec::new();
        for code in supported {
            if code != original && !targets.contains(&code) {
                targets.push(code);
            }
        }
        Self { original, targets }
    }

    /// The language records are authored in.
    pub fn original(&self) -> &LanguageCode {
        &self.original
    }

    /// Languages the fill policy translates into.
    pub fn targets(&self) -> &[LanguageCode] {
        &self.targets
    }

    /// Check if a code is a translation target.
    pub fn is_target(&self, code: &LanguageCode) -> bool {
        self.targets.contains(code)
    }

    /// Check if a code can be served as its own view (original or target).
    pub fn is_served(&self, code: &LanguageCode) -> bool {
        *code == self.original || self.is_target(code)
    }

    /// Map a requested `lang` parameter to the language whose view is served.
    ///
    /// Omitted, malformed and unsupported codes all resolve to the original
    /// language; the read path never fails on a bad `lang`.
    pub fn resolve_request(&self, requested: Option<&str>) -> LanguageCode {
        requested
            .and_then(|raw| LanguageCode::parse(raw).ok())
            .filter(|code| self.is_served(code))
            .unwrap_or_else(|| self.original.clone())
    }
}
