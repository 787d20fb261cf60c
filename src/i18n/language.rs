//! Language code: open, validated language tag.
//!
//! Any well-formed tag can be represented. Whether a code is *supported*
//! is decided by [`Languages`](crate::i18n::Languages), not by this type.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::OnceLock;

static CODE_REGEX: OnceLock<Regex> = OnceLock::new();

/// A normalized language tag (e.g. "en", "hi", "pt-br").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

/// Error returned when a string is not a usable language tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid language code: '{0}'")]
pub struct InvalidLanguageCode(pub String);

impl LanguageCode {
    /// Parse and normalize a language tag.
    ///
    /// Input is trimmed, lowercased and `_` is replaced by `-`, so
    /// `"pt_BR"` and `"pt-br"` name the same language.
    ///
    /// # Returns
    /// * `Ok(LanguageCode)` for tags like `en`, `hi`, `zh-hans`
    /// * `Err(InvalidLanguageCode)` for empty or malformed input
    pub fn parse(code: &str) -> Result<Self, InvalidLanguageCode> {
        let normalized = code.trim().to_lowercase().replace('_', "-");
        let regex = CODE_REGEX.get_or_init(|| {
            Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})*$").expect("language code regex is valid")
        });

        if regex.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(InvalidLanguageCode(code.to_string()))
        }
    }

    /// The normalized tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// English display name for the languages we commonly serve.
    ///
    /// Used in translator prompts; unknown codes fall back to the tag itself.
    pub fn display_name(&self) -> &str {
        match self.0.as_str() {
            "en" => "English",
            "hi" => "Hindi",
            "bn" => "Bengali",
            "es" => "Spanish",
            "fr" => "French",
            "de" => "German",
            "ta" => "Tamil",
            "te" => "Telugu",
            "mr" => "Marathi",
            "ur" => "Urdu",
            other => other,
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LanguageCode {
    type Err = InvalidLanguageCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for LanguageCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        LanguageCode::parse(&raw).map_err(serde::de::Error::custom)
    }
}
