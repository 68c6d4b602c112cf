//! Persisted named flags

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// Abstraction for option backends
#[async_trait]
pub trait OptionStore: Send + Sync {
    /// Whether the flag has been set
    async fn get_flag(&self, name: &str) -> Result<bool>;

    /// Set the flag
    async fn set_flag(&self, name: &str) -> Result<()>;
}

/// In-memory option implementation for testing
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    flags: Mutex<HashSet<String>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get_flag(&self, name: &str) -> Result<bool> {
        let flags = self
            .flags
            .lock()
            .map_err(|_| StoreError::Backend("Lock poisoned".into()))?;
        Ok(flags.contains(name))
    }

    async fn set_flag(&self, name: &str) -> Result<()> {
        let mut flags = self
            .flags
            .lock()
            .map_err(|_| StoreError::Backend("Lock poisoned".into()))?;
        flags.insert(name.to_string());
        Ok(())
    }
}
