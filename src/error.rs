//! Error types for the record store and write path.
//!
//! Translation failures live in [`crate::translation::TranslationError`]
//! and are recovered inside the fill policy, so they never appear here.

/// Errors surfaced by [`ContentStore`](crate::store::ContentStore) and the
/// read path.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id
    #[error("FAQ {0} not found")]
    NotFound(i64),

    /// Input rejected before anything was persisted or translated
    #[error("invalid FAQ: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(StoreError::NotFound(7).to_string(), "FAQ 7 not found");
        assert_eq!(
            StoreError::validation("question is required").to_string(),
            "invalid FAQ: question is required"
        );
    }

    #[test]
    fn test_database_error_conversion() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
