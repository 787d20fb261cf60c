//! Language handling for multi-language FAQs.
//!
//! # Architecture
//!
//! - `language`: validated, normalized [`LanguageCode`] tags
//! - `registry`: the configured original language and translation targets
//! - `validator`: structural checks on machine-translated text
//!
//! # Example
//!
//! ```rust,ignore
//! use faq_translate::i18n::{LanguageCode, Languages};
//!
//! let languages = Languages::new(LanguageCode::parse("en")?, [LanguageCode::parse("hi")?]);
//! assert_eq!(languages.resolve_request(Some("xx")).as_str(), "en");
//! ```

mod language;
mod registry;
mod validator;

pub use language::{InvalidLanguageCode, LanguageCode};
pub use registry::Languages;
pub use validator::{TranslationValidator, ValidationReport};
