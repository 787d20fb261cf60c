use crate::i18n::{LanguageCode, Languages};
use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Translation backend selected by `TRANSLATOR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatorKind {
    OpenAi,
    /// Deterministic local backend, no API key needed
    Mock,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub database_url: String,
    pub port: u16,

    // Languages
    pub original_language: LanguageCode,
    pub supported_languages: Vec<LanguageCode>,

    // Cache / translation
    pub cache_ttl: Duration,
    /// Bound on one backend attempt; retries multiply the worst case
    pub translation_timeout: Duration,
    pub backfill_on_start: bool,

    // Translator
    pub translator: TranslatorKind,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment in production,
    /// a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let translator = match var("TRANSLATOR").as_deref().map(str::trim) {
            None | Some("openai") => TranslatorKind::OpenAi,
            Some("mock") => TranslatorKind::Mock,
            Some(other) => bail!("TRANSLATOR must be 'openai' or 'mock', got '{}'", other),
        };

        let openai_api_key = var("OPENAI_API_KEY");
        if translator == TranslatorKind::OpenAi && openai_api_key.is_none() {
            bail!("OPENAI_API_KEY not set (required when TRANSLATOR=openai)");
        }

        let original_language = LanguageCode::parse(
            &var("ORIGINAL_LANGUAGE").unwrap_or_else(|| "en".to_string()),
        )
        .context("Invalid ORIGINAL_LANGUAGE")?;

        let supported_languages = var("SUPPORTED_LANGUAGES")
            .unwrap_or_else(|| "hi,bn".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(LanguageCode::parse)
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid SUPPORTED_LANGUAGES")?;

        Ok(Self {
            // Server
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite://faqs.db".to_string()),
            port: parse_or(&var, "PORT", 8080)?,

            // Languages
            original_language,
            supported_languages,

            // Cache / translation
            cache_ttl: Duration::from_secs(parse_or(&var, "CACHE_TTL_SECS", 120)?),
            translation_timeout: Duration::from_secs(parse_or(&var, "TRANSLATION_TIMEOUT_SECS", 10)?),
            backfill_on_start: parse_or(&var, "BACKFILL_ON_START", true)?,

            // Translator
            translator,
            openai_api_key,
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            openai_api_url: var("OPENAI_API_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string()),
        })
    }

    pub fn languages(&self) -> Languages {
        Languages::new(
            self.original_language.clone(),
            self.supported_languages.iter().cloned(),
        )
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}
