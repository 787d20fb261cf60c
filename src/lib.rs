//! Multilingual FAQ service.
//!
//! Records are authored in one language and translated on write into every
//! supported language by a pluggable [`translation::Translator`]. Reads go
//! through a per-language cache that falls back to the original text for
//! any language without a translation.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod fill;
pub mod i18n;
pub mod metrics;
pub mod model;
pub mod query;
pub mod retry;
pub mod routes;
pub mod store;
pub mod translation;
