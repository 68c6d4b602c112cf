//! Car record storage

use crate::entities::{CarRecord, Page, PostStatus, RecordId, TaxonomyCategory, TermId};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Abstraction for car record backends
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Check whether any record has exactly this title
    async fn exists_by_title(&self, title: &str) -> Result<bool>;

    /// Insert a new record and return its id
    ///
    /// Rejects an empty title with `StoreError::EmptyTitle`.
    async fn create(&self, title: &str, status: PostStatus) -> Result<RecordId>;

    /// Replace the record's terms in one category
    async fn assign_terms(
        &self,
        id: RecordId,
        category: TaxonomyCategory,
        terms: &[TermId],
    ) -> Result<()>;

    /// Published records, newest first, with the total published count
    async fn query_published(&self, offset: u64, limit: u64) -> Result<Page<CarRecord>>;
}

/// In-memory record implementation for testing
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    records: Mutex<Vec<CarRecord>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a record by id (useful for testing)
    pub fn get(&self, id: RecordId) -> Option<CarRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.iter().find(|r| r.id == id).cloned())
    }

    /// All records with the given title (useful for testing)
    pub fn find_by_title(&self, title: &str) -> Vec<CarRecord> {
        self.records
            .lock()
            .map(|records| records.iter().filter(|r| r.title == title).cloned().collect())
            .unwrap_or_default()
    }

    /// Get number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<CarRecord>>> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("Lock poisoned".into()))
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn exists_by_title(&self, title: &str) -> Result<bool> {
        let records = self.lock()?;
        Ok(records.iter().any(|r| r.title == title))
    }

    async fn create(&self, title: &str, status: PostStatus) -> Result<RecordId> {
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let mut records = self.lock()?;
        let id = RecordId(records.len() as u64 + 1);
        records.push(CarRecord::new(id, title, status));
        Ok(id)
    }

    async fn assign_terms(
        &self,
        id: RecordId,
        category: TaxonomyCategory,
        terms: &[TermId],
    ) -> Result<()> {
        let mut records = self.lock()?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::RecordNotFound(id))?;

        if terms.is_empty() {
            record.terms.remove(&category);
        } else {
            record.terms.insert(category, terms.to_vec());
        }
        Ok(())
    }

    async fn query_published(&self, offset: u64, limit: u64) -> Result<Page<CarRecord>> {
        let records = self.lock()?;

        // Insertion order is creation order, so newest first is a reverse walk
        let published: Vec<&CarRecord> = records
            .iter()
            .rev()
            .filter(|r| r.status == PostStatus::Published)
            .collect();

        let total = published.len() as u64;
        let items = published
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, total))
    }
}
