//! SQLite storage implementation
//!
//! Stores taxonomy terms, car records with their term assignments, and option
//! flags in a SQLite database file.

use async_trait::async_trait;
use carlot::store::{ContentStore, OptionStore, TaxonomyStore};
use carlot::{
    CarRecord, Page, PostStatus, RecordId, Result, StoreError, TaxonomyCategory, Term, TermId,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::debug;

use crate::media_storage::SqliteMediaStorage;

/// SQLite-based storage for terms, records and options
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance with the given database path
    pub async fn new(database_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_path)
            .map_err(|e| StoreError::Backend(format!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to SQLite: {}", e)))?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create SQLite storage from environment variable
    ///
    /// Expects DATABASE_URL environment variable with SQLite connection string
    /// Example: sqlite:./data/carlot.db
    pub async fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/carlot.db".to_string());

        Self::new(&database_url).await
    }

    /// Media storage sharing this database, with file bytes under `media_dir`
    pub fn media_storage(&self, media_dir: impl AsRef<Path>) -> SqliteMediaStorage {
        SqliteMediaStorage::new(self.pool.clone(), media_dir)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        let statements = [
            (
                "terms",
                r#"
                CREATE TABLE IF NOT EXISTS terms (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    category TEXT NOT NULL,          -- Category slug (make, model, fuel_type, lyear)
                    name TEXT NOT NULL,
                    UNIQUE (category, name)
                )
                "#,
            ),
            (
                "cars",
                r#"
                CREATE TABLE IF NOT EXISTS cars (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    status TEXT NOT NULL,            -- draft | published
                    created_at TEXT NOT NULL
                )
                "#,
            ),
            (
                "car_terms",
                r#"
                CREATE TABLE IF NOT EXISTS car_terms (
                    car_id INTEGER NOT NULL REFERENCES cars(id),
                    category TEXT NOT NULL,
                    term_id INTEGER NOT NULL,
                    position INTEGER NOT NULL,
                    PRIMARY KEY (car_id, category, term_id)
                )
                "#,
            ),
            (
                "options",
                r#"
                CREATE TABLE IF NOT EXISTS options (
                    name TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                )
                "#,
            ),
            (
                "media",
                r#"
                CREATE TABLE IF NOT EXISTS media (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    car_id INTEGER NOT NULL,
                    file_name TEXT NOT NULL,
                    content_type TEXT NOT NULL,
                    storage_key TEXT NOT NULL,       -- File name under the media directory
                    created_at TEXT NOT NULL
                )
                "#,
            ),
            (
                "thumbnails",
                r#"
                CREATE TABLE IF NOT EXISTS thumbnails (
                    car_id INTEGER PRIMARY KEY,
                    media_id INTEGER NOT NULL REFERENCES media(id)
                )
                "#,
            ),
            (
                "cars title index",
                "CREATE INDEX IF NOT EXISTS idx_cars_title ON cars(title)",
            ),
            (
                "cars status index",
                "CREATE INDEX IF NOT EXISTS idx_cars_status ON cars(status, id)",
            ),
        ];

        for (name, sql) in statements {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to create {}: {}", name, e)))?;
        }

        Ok(())
    }

    async fn find_term(&self, category: TaxonomyCategory, name: &str) -> Result<Option<TermId>> {
        let row = sqlx::query("SELECT id FROM terms WHERE category = ? AND name = ?")
            .bind(category.slug())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to look up term: {}", e)))?;

        Ok(row.map(|r| TermId(r.get::<i64, _>("id") as u64)))
    }

    async fn record_terms(&self, id: RecordId) -> Result<BTreeMap<TaxonomyCategory, Vec<TermId>>> {
        let rows = sqlx::query(
            "SELECT category, term_id FROM car_terms WHERE car_id = ? ORDER BY category, position",
        )
        .bind(id.0 as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("Failed to load car terms: {}", e)))?;

        let mut terms: BTreeMap<TaxonomyCategory, Vec<TermId>> = BTreeMap::new();
        for row in rows {
            let slug: String = row.get("category");
            let Some(category) = TaxonomyCategory::from_slug(&slug) else {
                debug!("Ignoring term assignment with unknown category '{}'", slug);
                continue;
            };
            terms
                .entry(category)
                .or_default()
                .push(TermId(row.get::<i64, _>("term_id") as u64));
        }
        Ok(terms)
    }
}

fn term_from_row(row: &SqliteRow) -> Result<Term> {
    let slug: String = row.get("category");
    let category = TaxonomyCategory::from_slug(&slug)
        .ok_or_else(|| StoreError::Backend(format!("Unknown term category: {}", slug)))?;

    Ok(Term {
        id: TermId(row.get::<i64, _>("id") as u64),
        category,
        name: row.get("name"),
    })
}

fn record_from_row(row: &SqliteRow) -> Result<CarRecord> {
    let status: String = row.get("status");
    let status = PostStatus::parse(&status)
        .ok_or_else(|| StoreError::Backend(format!("Unknown record status: {}", status)))?;

    let created_at: OffsetDateTime = row
        .try_get("created_at")
        .map_err(|e| StoreError::Backend(format!("Failed to read timestamp: {}", e)))?;

    Ok(CarRecord {
        id: RecordId(row.get::<i64, _>("id") as u64),
        title: row.get("title"),
        status,
        terms: BTreeMap::new(),
        created_at,
    })
}

#[async_trait]
impl TaxonomyStore for SqliteStorage {
    async fn create_term(&self, category: TaxonomyCategory, name: &str) -> Result<TermId> {
        if let Some(existing) = self.find_term(category, name).await? {
            return Err(StoreError::TermExists {
                category,
                name: name.to_string(),
                existing,
            });
        }

        let result = sqlx::query("INSERT INTO terms (category, name) VALUES (?, ?)")
            .bind(category.slug())
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to create term: {}", e)))?;

        Ok(TermId(result.last_insert_rowid() as u64))
    }

    async fn list_terms(&self, category: TaxonomyCategory) -> Result<Vec<Term>> {
        let rows = sqlx::query("SELECT id, category, name FROM terms WHERE category = ? ORDER BY name")
            .bind(category.slug())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to list terms: {}", e)))?;

        rows.iter().map(term_from_row).collect()
    }

    async fn get_term(&self, id: TermId) -> Result<Option<Term>> {
        let row = sqlx::query("SELECT id, category, name FROM terms WHERE id = ?")
            .bind(id.0 as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to get term: {}", e)))?;

        row.as_ref().map(term_from_row).transpose()
    }

    async fn term_count(&self, category: TaxonomyCategory) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM terms WHERE category = ?")
            .bind(category.slug())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to count terms: {}", e)))?;

        Ok(count as u64)
    }
}

#[async_trait]
impl ContentStore for SqliteStorage {
    async fn exists_by_title(&self, title: &str) -> Result<bool> {
        // '=' on TEXT uses the BINARY collation, so the match is case-sensitive
        let found = sqlx::query("SELECT 1 FROM cars WHERE title = ? LIMIT 1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to look up title: {}", e)))?;

        Ok(found.is_some())
    }

    async fn create(&self, title: &str, status: PostStatus) -> Result<RecordId> {
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let result = sqlx::query("INSERT INTO cars (title, status, created_at) VALUES (?, ?, ?)")
            .bind(title)
            .bind(status.as_str())
            .bind(OffsetDateTime::now_utc())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to insert car: {}", e)))?;

        Ok(RecordId(result.last_insert_rowid() as u64))
    }

    async fn assign_terms(
        &self,
        id: RecordId,
        category: TaxonomyCategory,
        terms: &[TermId],
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

        let exists = sqlx::query("SELECT 1 FROM cars WHERE id = ?")
            .bind(id.0 as i64)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to look up car: {}", e)))?;
        if exists.is_none() {
            return Err(StoreError::RecordNotFound(id));
        }

        sqlx::query("DELETE FROM car_terms WHERE car_id = ? AND category = ?")
            .bind(id.0 as i64)
            .bind(category.slug())
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to clear car terms: {}", e)))?;

        for (position, term) in terms.iter().enumerate() {
            sqlx::query(
                "INSERT OR IGNORE INTO car_terms (car_id, category, term_id, position) VALUES (?, ?, ?, ?)",
            )
            .bind(id.0 as i64)
            .bind(category.slug())
            .bind(term.0 as i64)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to assign term: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to commit car terms: {}", e)))?;

        Ok(())
    }

    async fn query_published(&self, offset: u64, limit: u64) -> Result<Page<CarRecord>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars WHERE status = ?")
            .bind(PostStatus::Published.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to count cars: {}", e)))?;

        let rows = sqlx::query(
            r#"
            SELECT id, title, status, created_at
            FROM cars
            WHERE status = ?
            ORDER BY id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(PostStatus::Published.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("Failed to query cars: {}", e)))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = record_from_row(row)?;
            record.terms = self.record_terms(record.id).await?;
            records.push(record);
        }

        Ok(Page::new(records, total as u64))
    }
}

#[async_trait]
impl OptionStore for SqliteStorage {
    async fn get_flag(&self, name: &str) -> Result<bool> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM options WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to read option: {}", e)))?;

        Ok(matches!(value.as_deref(), Some("1")))
    }

    async fn set_flag(&self, name: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO options (name, value) VALUES (?, '1')")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to write option: {}", e)))?;

        Ok(())
    }
}
