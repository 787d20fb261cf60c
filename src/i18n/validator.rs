//! Translation quality validation module.
//!
//! FAQ answers are rich text (HTML from the admin editor). Machine
//! translation occasionally drops links or mangles markup, so every filled
//! slot is checked against its source and mismatches are logged. Validation
//! never rejects a translation.

use regex::Regex;
use std::sync::OnceLock;

/// Structural mismatches found between a source text and its translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validator for translation quality.
pub struct TranslationValidator;

static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static CODE_SPAN_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Validate that a translation preserves the structure of the original.
    ///
    /// Checks performed:
    /// - URLs are preserved verbatim
    /// - HTML tag names appear in the same order
    /// - inline `<code>` spans are kept untranslated
    /// - the translation is not identical to a non-trivial source (a sign
    ///   the backend echoed its input)
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::default();

        let orig_urls = Self::extract_urls(original);
        let trans_urls = Self::extract_urls(translated);
        if orig_urls != trans_urls {
            report.warnings.push(format!(
                "URL mismatch: original has {} URLs, translation has {} URLs",
                orig_urls.len(),
                trans_urls.len()
            ));
        }

        let orig_tags = Self::extract_tags(original);
        let trans_tags = Self::extract_tags(translated);
        if orig_tags != trans_tags {
            report.warnings.push(format!(
                "Markup mismatch: original has tags {:?}, translation has {:?}",
                orig_tags, trans_tags
            ));
        }

        let orig_code = Self::extract_code_spans(original);
        let trans_code = Self::extract_code_spans(translated);
        if orig_code != trans_code {
            report.warnings.push(format!(
                "Code span mismatch: original has {:?}, translation has {:?}",
                orig_code, trans_code
            ));
        }

        if original.split_whitespace().count() > 3 && original.trim() == translated.trim() {
            report
                .warnings
                .push("Translation is identical to the original text".to_string());
        }

        report
    }

    /// Extract all URLs from text (plain or inside `href` attributes)
    fn extract_urls(text: &str) -> Vec<String> {
        let regex = URL_REGEX.get_or_init(|| Regex::new(r#"https?://[^\s"'<>)\]]+"#).unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Extract HTML tag names in document order, closing tags prefixed with `/`
    fn extract_tags(text: &str) -> Vec<String> {
        let regex = TAG_REGEX.get_or_init(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());

        regex
            .captures_iter(text)
            .map(|cap| format!("{}{}", &cap[1], cap[2].to_lowercase()))
            .collect()
    }

    /// Extract the contents of `<code>` spans
    fn extract_code_spans(text: &str) -> Vec<String> {
        let regex = CODE_SPAN_REGEX.get_or_init(|| Regex::new(r"(?s)<code>(.*?)</code>").unwrap());

        regex
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== URL Extraction Tests ====================

    #[test]
    fn test_extract_urls_plain_and_href() {
        let text = r#"See https://example.com or <a href="https://docs.rs/x">docs</a>"#;
        let urls = TranslationValidator::extract_urls(text);
        assert_eq!(urls, vec!["https://example.com", "https://docs.rs/x"]);
    }

    #[test]
    fn test_extract_urls_none() {
        assert!(TranslationValidator::extract_urls("No URLs here").is_empty());
    }

    // ==================== Tag Extraction Tests ====================

    #[test]
    fn test_extract_tags_in_order() {
        let text = "<p>Django is a <strong>web</strong> framework.</p>";
        let tags = TranslationValidator::extract_tags(text);
        assert_eq!(tags, vec!["p", "strong", "/strong", "/p"]);
    }

    #[test]
    fn test_extract_tags_normalizes_case() {
        let tags = TranslationValidator::extract_tags("<P>x</P><br/>");
        assert_eq!(tags, vec!["p", "/p", "br"]);
    }

    #[test]
    fn test_extract_code_spans() {
        let spans = TranslationValidator::extract_code_spans("Run <code>cargo run</code> now");
        assert_eq!(spans, vec!["cargo run"]);
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_clean_html_translation() {
        let original = r#"<p>Read the <a href="https://example.com">guide</a>.</p>"#;
        let translated = r#"<p><a href="https://example.com">गाइड</a> पढ़ें।</p>"#;

        let report = TranslationValidator::validate(original, translated);
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_validate_missing_url() {
        let report = TranslationValidator::validate("Read more at https://example.com", "और पढ़ें");
        assert!(report.has_warnings());
        assert!(report.warnings[0].contains("URL mismatch"));
    }

    #[test]
    fn test_validate_dropped_markup() {
        let report = TranslationValidator::validate("<p>Django</p>", "Django");
        assert!(report.warnings.iter().any(|w| w.contains("Markup mismatch")));
    }

    #[test]
    fn test_validate_translated_code_span() {
        let report = TranslationValidator::validate(
            "Run <code>manage.py</code>",
            "चलाएँ <code>मैनेज.py</code>",
        );
        assert!(report.warnings.iter().any(|w| w.contains("Code span mismatch")));
    }

    #[test]
    fn test_validate_echoed_input() {
        let text = "Django is a web framework.";
        let report = TranslationValidator::validate(text, text);
        assert!(report.warnings.iter().any(|w| w.contains("identical")));
    }

    #[test]
    fn test_validate_short_identical_is_fine() {
        // Short strings like product names legitimately survive unchanged
        let report = TranslationValidator::validate("Django", "Django");
        assert!(report.is_clean());
    }
}
