//! FAQ records and their per-language projections.

use crate::error::StoreError;
use crate::i18n::{LanguageCode, Languages};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A question/answer pair in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqContent {
    pub question: String,
    pub answer: String,
}

impl FaqContent {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Question => &self.question,
            Field::Answer => &self.answer,
        }
    }

    fn is_complete(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// Translatable field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Question,
    Answer,
}

/// A stored FAQ.
///
/// `translations` holds one complete [`FaqContent`] per language; a language
/// is either fully translated or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Faq {
    pub id: i64,
    #[serde(flatten)]
    pub original: FaqContent,
    pub translations: BTreeMap<LanguageCode, FaqContent>,
    pub created_at: String,
    pub updated_at: String,
}

impl Faq {
    pub fn translation(&self, lang: &LanguageCode) -> Option<&FaqContent> {
        self.translations.get(lang)
    }

    /// Target languages that have no translation yet.
    pub fn missing_languages<'a>(&self, languages: &'a Languages) -> Vec<&'a LanguageCode> {
        languages
            .targets()
            .iter()
            .filter(|lang| !self.translations.contains_key(*lang))
            .collect()
    }
}

impl fmt::Display for Faq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original.question)
    }
}

/// The `{question, answer}` shape served by `GET /faqs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqView {
    pub question: String,
    pub answer: String,
}

/// Input for creating a record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
    /// Translations supplied by the author; fill never overwrites these
    #[serde(default)]
    pub translations: BTreeMap<LanguageCode, FaqContent>,
}

impl NewFaq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            translations: BTreeMap::new(),
        }
    }

    pub fn with_translation(mut self, lang: LanguageCode, content: FaqContent) -> Self {
        self.translations.insert(lang, content);
        self
    }

    /// Reject missing originals and unusable translations.
    pub fn validate(&self, languages: &Languages) -> Result<(), StoreError> {
        require_text("question", &self.question)?;
        require_text("answer", &self.answer)?;
        validate_translations(&self.translations, languages)
    }
}

/// Partial update of a record. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaqPatch {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub translations: BTreeMap<LanguageCode, FaqContent>,
}

impl FaqPatch {
    pub fn validate(&self, languages: &Languages) -> Result<(), StoreError> {
        if let Some(question) = &self.question {
            require_text("question", question)?;
        }
        if let Some(answer) = &self.answer {
            require_text("answer", answer)?;
        }
        validate_translations(&self.translations, languages)
    }

    /// Check whether applying this patch changes the original text of `faq`.
    pub fn changes_original(&self, faq: &Faq) -> bool {
        self.question
            .as_ref()
            .is_some_and(|q| *q != faq.original.question)
            || self
                .answer
                .as_ref()
                .is_some_and(|a| *a != faq.original.answer)
    }
}

fn require_text(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_translations(
    translations: &BTreeMap<LanguageCode, FaqContent>,
    languages: &Languages,
) -> Result<(), StoreError> {
    for (lang, content) in translations {
        if !languages.is_target(lang) {
            return Err(StoreError::validation(format!(
                "translation language '{}' is not a supported target",
                lang
            )));
        }
        if !content.is_complete() {
            return Err(StoreError::validation(format!(
                "translation '{}' needs both question and answer",
                lang
            )));
        }
    }
    Ok(())
}
