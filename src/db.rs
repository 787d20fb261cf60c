use crate::i18n::LanguageCode;
use crate::model::{Faq, FaqContent, NewFaq};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Persistence for FAQ records.
///
/// Pure storage: it never calls the translator and never touches the cache.
/// Translations live in their own table keyed by `(faq_id, lang)`, so adding
/// a language needs no schema change.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at `database_url` and create tables.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            // Each connection to :memory: is its own database, so keep exactly one alive
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let db = Self { pool };
        db.create_tables().await?;
        Ok(db)
    }

    /// Private in-memory database, used by tests and `DATABASE_URL=sqlite::memory:`.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Self::connect("sqlite::memory:").await
    }

    async fn create_tables(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS faqs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS faq_translations (
                faq_id INTEGER NOT NULL REFERENCES faqs(id) ON DELETE CASCADE,
                lang TEXT NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                PRIMARY KEY (faq_id, lang)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a record with any author-supplied translations.
    /// Returns the new id.
    pub async fn insert_faq(&self, faq: &NewFaq) -> Result<i64, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            "INSERT INTO faqs (question, answer, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        )
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (lang, content) in &faq.translations {
            sqlx::query(
                "INSERT INTO faq_translations (faq_id, lang, question, answer) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(id)
            .bind(lang.as_str())
            .bind(&content.question)
            .bind(&content.answer)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Get one record with its translations.
    pub async fn get_faq(&self, id: i64) -> Result<Option<Faq>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, question, answer, created_at, updated_at FROM faqs WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let rows = sqlx::query(
            "SELECT faq_id, lang, question, answer FROM faq_translations WHERE faq_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut translations = BTreeMap::new();
        for row in rows {
            let (_, lang, content) = decode_translation(&row)?;
            translations.insert(lang, content);
        }

        Ok(Some(decode_faq(&row, translations)?))
    }

    /// Get all records ordered by id.
    pub async fn list_faqs(&self) -> Result<Vec<Faq>, sqlx::Error> {
        let faq_rows = sqlx::query(
            "SELECT id, question, answer, created_at, updated_at FROM faqs ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let translation_rows =
            sqlx::query("SELECT faq_id, lang, question, answer FROM faq_translations")
                .fetch_all(&self.pool)
                .await?;

        let mut by_faq: HashMap<i64, BTreeMap<LanguageCode, FaqContent>> = HashMap::new();
        for row in translation_rows {
            let (faq_id, lang, content) = decode_translation(&row)?;
            by_faq.entry(faq_id).or_default().insert(lang, content);
        }

        faq_rows
            .iter()
            .map(|row| {
                let id: i64 = row.try_get("id")?;
                decode_faq(row, by_faq.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    /// Get all record ids in ascending order.
    pub async fn faq_ids(&self) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM faqs ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    /// Apply an edit in one transaction.
    ///
    /// - `question`/`answer` replace the original when given
    /// - `clear_translations` drops every stored translation (the original changed)
    /// - `translations` are written last, replacing any existing slot
    ///
    /// Returns false if the record does not exist.
    pub async fn update_faq(
        &self,
        id: i64,
        question: Option<&str>,
        answer: Option<&str>,
        clear_translations: bool,
        translations: &BTreeMap<LanguageCode, FaqContent>,
    ) -> Result<bool, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let rows_affected = sqlx::query(
            "UPDATE faqs SET
                question = COALESCE(?1, question),
                answer = COALESCE(?2, answer),
                updated_at = ?3
             WHERE id = ?4",
        )
        .bind(question)
        .bind(answer)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if clear_translations {
            sqlx::query("DELETE FROM faq_translations WHERE faq_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        for (lang, content) in translations {
            sqlx::query(
                "INSERT INTO faq_translations (faq_id, lang, question, answer) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (faq_id, lang) DO UPDATE SET question = excluded.question, answer = excluded.answer",
            )
            .bind(id)
            .bind(lang.as_str())
            .bind(&content.question)
            .bind(&content.answer)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Store filled translations without overwriting existing slots.
    /// Returns the number of slots written.
    pub async fn insert_missing_translations(
        &self,
        id: i64,
        translations: &BTreeMap<LanguageCode, FaqContent>,
    ) -> Result<u64, sqlx::Error> {
        if translations.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for (lang, content) in translations {
            written += sqlx::query(
                "INSERT INTO faq_translations (faq_id, lang, question, answer) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (faq_id, lang) DO NOTHING",
            )
            .bind(id)
            .bind(lang.as_str())
            .bind(&content.question)
            .bind(&content.answer)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    /// Delete a record and its translations. Returns false if it did not exist.
    pub async fn delete_faq(&self, id: i64) -> Result<bool, sqlx::Error> {
        let rows_affected = sqlx::query("DELETE FROM faqs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    #[cfg(test)]
    async fn faq_count(&self) -> Result<usize, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM faqs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

fn decode_faq(row: &SqliteRow, translations: BTreeMap<LanguageCode, FaqContent>) -> Result<Faq, sqlx::Error> {
    Ok(Faq {
        id: row.try_get("id")?,
        original: FaqContent {
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
        },
        translations,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn decode_translation(row: &SqliteRow) -> Result<(i64, LanguageCode, FaqContent), sqlx::Error> {
    let lang: String = row.try_get("lang")?;
    let lang = LanguageCode::parse(&lang).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok((
        row.try_get("faq_id")?,
        lang,
        FaqContent {
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
        },
    ))
}
