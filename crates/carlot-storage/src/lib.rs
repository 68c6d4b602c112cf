//! # Carlot Storage
//!
//! Persistent implementations of the carlot store traits:
//! - [`SqliteStorage`] keeps taxonomy terms, car records and option flags in
//!   a SQLite database
//! - [`SqliteMediaStorage`] keeps media metadata in the same database and the
//!   uploaded bytes in a directory on disk
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use carlot::Stores;
//! use carlot_storage::SqliteStorage;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(SqliteStorage::new("sqlite:./data/carlot.db").await?);
//! let media = Arc::new(storage.media_storage("./data/media"));
//!
//! let stores = Stores::new(storage.clone(), storage.clone(), media, storage);
//! carlot::seed_sample_data(&stores).await?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "sqlite")]
pub mod media_storage;
#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

#[cfg(feature = "sqlite")]
pub use media_storage::SqliteMediaStorage;
#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;
