//! Media storage with SQLite metadata and file bytes on disk

use async_trait::async_trait;
use carlot::store::MediaStore;
use carlot::{MediaId, MediaItem, RecordId, Result, StoreError, UploadedFile};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Media storage keeping uploads in a local directory
pub struct SqliteMediaStorage {
    pool: SqlitePool,
    base_path: PathBuf,
}

impl SqliteMediaStorage {
    /// Create media storage over an existing pool
    ///
    /// The schema is created by [`SqliteStorage`](crate::SqliteStorage).
    pub fn new(pool: SqlitePool, base_path: impl AsRef<Path>) -> Self {
        Self {
            pool,
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Directory the uploaded bytes are written to
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, storage_key: &str) -> PathBuf {
        self.base_path.join(storage_key)
    }
}

/// Storage key for an upload: a random name keeping the original extension
fn storage_key(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase());

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

fn item_from_row(row: &SqliteRow) -> MediaItem {
    MediaItem {
        id: MediaId(row.get::<i64, _>("id") as u64),
        file_name: row.get("file_name"),
        content_type: row.get("content_type"),
    }
}

#[async_trait]
impl MediaStore for SqliteMediaStorage {
    async fn upload(&self, record: RecordId, file: UploadedFile) -> Result<MediaId> {
        if !file.is_image() {
            return Err(StoreError::UnsupportedMediaType(file.content_type));
        }

        fs::create_dir_all(&self.base_path).await?;

        let key = storage_key(&file.file_name);
        fs::write(self.file_path(&key), &file.bytes).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO media (car_id, file_name, content_type, storage_key, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.0 as i64)
        .bind(&file.file_name)
        .bind(&file.content_type)
        .bind(&key)
        .bind(OffsetDateTime::now_utc())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(result) => {
                let id = MediaId(result.last_insert_rowid() as u64);
                debug!("Stored media {} as {}", id, key);
                Ok(id)
            }
            Err(e) => {
                // Don't leave an orphaned file behind
                let _ = fs::remove_file(self.file_path(&key)).await;
                Err(StoreError::Backend(format!("Failed to save media: {}", e)))
            }
        }
    }

    async fn set_thumbnail(&self, record: RecordId, media: MediaId) -> Result<()> {
        let exists = sqlx::query("SELECT 1 FROM media WHERE id = ?")
            .bind(media.0 as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to look up media: {}", e)))?;
        if exists.is_none() {
            return Err(StoreError::MediaNotFound(media));
        }

        sqlx::query("INSERT OR REPLACE INTO thumbnails (car_id, media_id) VALUES (?, ?)")
            .bind(record.0 as i64)
            .bind(media.0 as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to set thumbnail: {}", e)))?;

        Ok(())
    }

    async fn thumbnail(&self, record: RecordId) -> Result<Option<MediaItem>> {
        let row = sqlx::query(
            r#"
            SELECT m.id, m.file_name, m.content_type
            FROM thumbnails t
            JOIN media m ON m.id = t.media_id
            WHERE t.car_id = ?
            "#,
        )
        .bind(record.0 as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("Failed to get thumbnail: {}", e)))?;

        Ok(row.as_ref().map(item_from_row))
    }

    async fn fetch(&self, media: MediaId) -> Result<(MediaItem, Vec<u8>)> {
        let row = sqlx::query(
            "SELECT id, file_name, content_type, storage_key FROM media WHERE id = ?",
        )
        .bind(media.0 as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("Failed to get media: {}", e)))?
        .ok_or(StoreError::MediaNotFound(media))?;

        let key: String = row.get("storage_key");
        let bytes = fs::read(self.file_path(&key)).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::MediaNotFound(media),
            _ => StoreError::Io(e),
        })?;

        Ok((item_from_row(&row), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_keeps_safe_extension() {
        assert!(storage_key("car.JPG").ends_with(".jpg"));
        assert!(!storage_key("car").contains('.'));
        assert!(!storage_key("../../etc/passwd").contains('/'));
        assert!(!storage_key("x.p/ng").contains('/'));
    }
}
