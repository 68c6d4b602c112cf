//! Storage abstraction for terms, records, media and options
//!
//! Each store is an async trait with an in-memory implementation for tests
//! and development. Persistent backends live in `carlot-storage`.

use std::sync::Arc;

pub mod content;
pub mod media;
pub mod options;
pub mod taxonomy;

pub use content::{ContentStore, MemoryContentStore};
pub use media::{MediaStore, MemoryMediaStore};
pub use options::{MemoryOptionStore, OptionStore};
pub use taxonomy::{MemoryTaxonomyStore, TaxonomyStore};

/// The set of stores the workflows operate on
#[derive(Clone)]
pub struct Stores {
    pub taxonomy: Arc<dyn TaxonomyStore>,
    pub content: Arc<dyn ContentStore>,
    pub media: Arc<dyn MediaStore>,
    pub options: Arc<dyn OptionStore>,
}

impl Stores {
    pub fn new(
        taxonomy: Arc<dyn TaxonomyStore>,
        content: Arc<dyn ContentStore>,
        media: Arc<dyn MediaStore>,
        options: Arc<dyn OptionStore>,
    ) -> Self {
        Self {
            taxonomy,
            content,
            media,
            options,
        }
    }

    /// Fresh in-memory stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryTaxonomyStore::new()),
            Arc::new(MemoryContentStore::new()),
            Arc::new(MemoryMediaStore::new()),
            Arc::new(MemoryOptionStore::new()),
        )
    }
}
