//! Taxonomy term storage

use crate::entities::{TaxonomyCategory, Term, TermId};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Abstraction for taxonomy term backends
#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    /// Create a term, failing with `TermExists` if the name is taken in the category
    async fn create_term(&self, category: TaxonomyCategory, name: &str) -> Result<TermId>;

    /// List the terms of a category ordered by name
    async fn list_terms(&self, category: TaxonomyCategory) -> Result<Vec<Term>>;

    /// Look up a term by id
    async fn get_term(&self, id: TermId) -> Result<Option<Term>>;

    /// Number of terms in a category
    async fn term_count(&self, category: TaxonomyCategory) -> Result<u64>;
}

/// In-memory taxonomy implementation for testing
#[derive(Debug, Default)]
pub struct MemoryTaxonomyStore {
    terms: Mutex<Vec<Term>>,
}

impl MemoryTaxonomyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Term>>> {
        self.terms
            .lock()
            .map_err(|_| StoreError::Backend("Lock poisoned".into()))
    }
}

#[async_trait]
impl TaxonomyStore for MemoryTaxonomyStore {
    async fn create_term(&self, category: TaxonomyCategory, name: &str) -> Result<TermId> {
        let mut terms = self.lock()?;

        if let Some(existing) = terms
            .iter()
            .find(|t| t.category == category && t.name == name)
        {
            return Err(StoreError::TermExists {
                category,
                name: name.to_string(),
                existing: existing.id,
            });
        }

        // Ids start at 1 so that 0 never names a real term
        let id = TermId(terms.len() as u64 + 1);
        terms.push(Term {
            id,
            category,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn list_terms(&self, category: TaxonomyCategory) -> Result<Vec<Term>> {
        let terms = self.lock()?;
        let mut listed: Vec<Term> = terms
            .iter()
            .filter(|t| t.category == category)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn get_term(&self, id: TermId) -> Result<Option<Term>> {
        let terms = self.lock()?;
        Ok(terms.iter().find(|t| t.id == id).cloned())
    }

    async fn term_count(&self, category: TaxonomyCategory) -> Result<u64> {
        let terms = self.lock()?;
        Ok(terms.iter().filter(|t| t.category == category).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_taxonomy_basic_operations() {
        let store = MemoryTaxonomyStore::new();

        let ford = store
            .create_term(TaxonomyCategory::Make, "Ford")
            .await
            .unwrap();
        let bmw = store
            .create_term(TaxonomyCategory::Make, "BMW")
            .await
            .unwrap();
        store
            .create_term(TaxonomyCategory::Model, "Focus")
            .await
            .unwrap();

        let makes = store.list_terms(TaxonomyCategory::Make).await.unwrap();
        let names: Vec<_> = makes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["BMW", "Ford"]);

        assert_eq!(store.term_count(TaxonomyCategory::Make).await.unwrap(), 2);
        assert_eq!(store.term_count(TaxonomyCategory::LaunchYear).await.unwrap(), 0);

        let term = store.get_term(ford).await.unwrap().unwrap();
        assert_eq!(term.name, "Ford");
        assert_ne!(ford, bmw);
        assert!(store.get_term(TermId(0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_taxonomy_duplicate_term() {
        let store = MemoryTaxonomyStore::new();
        let first = store
            .create_term(TaxonomyCategory::FuelType, "Petrol")
            .await
            .unwrap();

        match store.create_term(TaxonomyCategory::FuelType, "Petrol").await {
            Err(StoreError::TermExists { existing, .. }) => assert_eq!(existing, first),
            other => panic!("Expected TermExists error, got {:?}", other),
        }

        // Same name in another category is a different term
        assert!(
            store
                .create_term(TaxonomyCategory::Model, "Petrol")
                .await
                .is_ok()
        );
    }
}
