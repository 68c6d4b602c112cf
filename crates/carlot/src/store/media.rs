//! Media storage for uploaded car photos

use crate::entities::{MediaId, MediaItem, RecordId, UploadedFile};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Abstraction for media backends
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an uploaded file attached to a record
    ///
    /// Only image content is accepted.
    async fn upload(&self, record: RecordId, file: UploadedFile) -> Result<MediaId>;

    /// Use a media item as the record's thumbnail
    async fn set_thumbnail(&self, record: RecordId, media: MediaId) -> Result<()>;

    /// The record's thumbnail, if one is set
    async fn thumbnail(&self, record: RecordId) -> Result<Option<MediaItem>>;

    /// Media metadata and content
    async fn fetch(&self, media: MediaId) -> Result<(MediaItem, Vec<u8>)>;
}

#[derive(Debug, Default)]
struct MediaState {
    items: Vec<(MediaItem, Vec<u8>)>,
    thumbnails: HashMap<RecordId, MediaId>,
}

/// In-memory media implementation for testing
#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    state: Mutex<MediaState>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of stored media items
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.items.len()).unwrap_or(0)
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MediaState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("Lock poisoned".into()))
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(&self, _record: RecordId, file: UploadedFile) -> Result<MediaId> {
        if !file.is_image() {
            return Err(StoreError::UnsupportedMediaType(file.content_type));
        }

        let mut state = self.lock()?;
        let id = MediaId(state.items.len() as u64 + 1);
        let item = MediaItem {
            id,
            file_name: file.file_name,
            content_type: file.content_type,
        };
        state.items.push((item, file.bytes));
        Ok(id)
    }

    async fn set_thumbnail(&self, record: RecordId, media: MediaId) -> Result<()> {
        let mut state = self.lock()?;
        if !state.items.iter().any(|(item, _)| item.id == media) {
            return Err(StoreError::MediaNotFound(media));
        }
        state.thumbnails.insert(record, media);
        Ok(())
    }

    async fn thumbnail(&self, record: RecordId) -> Result<Option<MediaItem>> {
        let state = self.lock()?;
        Ok(state.thumbnails.get(&record).and_then(|media| {
            state
                .items
                .iter()
                .find(|(item, _)| item.id == *media)
                .map(|(item, _)| item.clone())
        }))
    }

    async fn fetch(&self, media: MediaId) -> Result<(MediaItem, Vec<u8>)> {
        let state = self.lock()?;
        state
            .items
            .iter()
            .find(|(item, _)| item.id == media)
            .cloned()
            .ok_or(StoreError::MediaNotFound(media))
    }
}
