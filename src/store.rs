//! Write path for FAQ records.
//!
//! Every mutation validates its input, persists the original fields, runs
//! the fill policy and invalidates the read cache. Writes to one record are
//! serialized; writes to different records run independently.

use crate::cache::FaqCache;
use crate::db::Database;
use crate::error::StoreError;
use crate::fill::FillPolicy;
use crate::metrics::ServiceMetrics;
use crate::model::{Faq, FaqPatch, NewFaq};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};

/// One async mutex per record id.
#[derive(Debug, Default)]
pub struct RecordLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl RecordLocks {
    /// Wait for exclusive access to record `id`.
    pub async fn lock(&self, id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Forget the lock of a deleted record.
    pub fn remove(&self, id: i64) {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Record store with translation fill and cache invalidation.
#[derive(Clone)]
pub struct ContentStore {
    db: Database,
    fill: FillPolicy,
    cache: Arc<FaqCache>,
    metrics: Arc<ServiceMetrics>,
    locks: Arc<RecordLocks>,
}

impl ContentStore {
    pub fn new(
        db: Database,
        fill: FillPolicy,
        cache: Arc<FaqCache>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            db,
            fill,
            cache,
            metrics,
            locks: Arc::new(RecordLocks::default()),
        }
    }

    /// Create a record and translate it into every missing language.
    ///
    /// Translation failures leave languages absent but never fail the call.
    pub async fn create(&self, new_faq: NewFaq) -> Result<Faq, StoreError> {
        new_faq.validate(self.fill.languages())?;

        let id = self.db.insert_faq(&new_faq).await?;
        let _guard = self.locks.lock(id).await;
        self.cache.invalidate();
        info!("Created FAQ {}", id);

        let mut faq = self.db.get_faq(id).await?.ok_or(StoreError::NotFound(id))?;
        self.apply_fill(&mut faq).await?;
        Ok(faq)
    }

    pub async fn get(&self, id: i64) -> Result<Faq, StoreError> {
        self.db.get_faq(id).await?.ok_or(StoreError::NotFound(id))
    }

    /// Apply a partial edit.
    ///
    /// Changing the question or answer drops stored translations (except
    /// those supplied in the same patch) and re-fills against the new text.
    pub async fn update(&self, id: i64, patch: FaqPatch) -> Result<Faq, StoreError> {
        patch.validate(self.fill.languages())?;

        let _guard = self.locks.lock(id).await;
        let current = self.get(id).await?;
        let original_changed = patch.changes_original(&current);

        let updated = self
            .db
            .update_faq(
                id,
                patch.question.as_deref(),
                patch.answer.as_deref(),
                original_changed,
                &patch.translations,
            )
            .await?;
        if !updated {
            return Err(StoreError::NotFound(id));
        }
        self.cache.invalidate();
        info!(
            "Updated FAQ {} (original changed: {}, {} explicit translation(s))",
            id,
            original_changed,
            patch.translations.len()
        );

        let mut faq = self.get(id).await?;
        self.apply_fill(&mut faq).await?;
        Ok(faq)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let _guard = self.locks.lock(id).await;
        if !self.db.delete_faq(id).await? {
            return Err(StoreError::NotFound(id));
        }
        self.locks.remove(id);
        self.cache.invalidate();
        info!("Deleted FAQ {}", id);
        Ok(())
    }

    /// Every record, ordered by id. Each call is one full store scan.
    pub async fn list(&self) -> Result<Vec<Faq>, StoreError> {
        self.metrics.record_store_scan();
        Ok(self.db.list_faqs().await?)
    }

    /// Run one fill pass over every record.
    ///
    /// Picks up languages added to the configuration after records were
    /// written, and slots whose earlier fill failed. Returns the number of
    /// translations written.
    pub async fn backfill(&self) -> Result<usize, StoreError> {
        let mut written = 0;

        for id in self.db.faq_ids().await? {
            let _guard = self.locks.lock(id).await;
            // Deleted since the id scan
            let Some(mut faq) = self.db.get_faq(id).await? else {
                continue;
            };
            if faq.missing_languages(self.fill.languages()).is_empty() {
                continue;
            }
            written += self.apply_fill(&mut faq).await?;
        }

        info!("Backfill wrote {} translation(s)", written);
        Ok(written)
    }

    /// Fill `faq`'s missing languages, persist the results and merge them
    /// into `faq`. Caller holds the record lock.
    async fn apply_fill(&self, faq: &mut Faq) -> Result<usize, StoreError> {
        let outcome = self.fill.fill(faq).await;
        if outcome.filled.is_empty() {
            return Ok(0);
        }

        let written = self
            .db
            .insert_missing_translations(faq.id, &outcome.filled)
            .await?;
        if written as usize != outcome.filled.len() {
            warn!(
                "FAQ {}: {} of {} filled translation(s) were already present",
                faq.id,
                outcome.filled.len() - written as usize,
                outcome.filled.len()
            );
        }

        for (lang, content) in outcome.filled {
            faq.translations.entry(lang).or_insert(content);
        }
        self.cache.invalidate();
        Ok(written as usize)
    }
}
