//! Core data structures for car listings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Identifier of a taxonomy term
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(pub u64);

/// Identifier of a stored car record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

/// Identifier of an uploaded media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MediaId(pub u64);

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

display_id!(TermId, RecordId, MediaId);

/// The categorical attributes a car is classified by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyCategory {
    Make,
    Model,
    FuelType,
    LaunchYear,
}

impl TaxonomyCategory {
    /// All categories in form order
    pub const ALL: [TaxonomyCategory; 4] = [
        TaxonomyCategory::Make,
        TaxonomyCategory::Model,
        TaxonomyCategory::FuelType,
        TaxonomyCategory::LaunchYear,
    ];

    /// Machine-readable slug used as the storage key
    pub fn slug(&self) -> &'static str {
        match self {
            TaxonomyCategory::Make => "make",
            TaxonomyCategory::Model => "model",
            TaxonomyCategory::FuelType => "fuel_type",
            TaxonomyCategory::LaunchYear => "lyear",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TaxonomyCategory::Make => "Make",
            TaxonomyCategory::Model => "Model",
            TaxonomyCategory::FuelType => "Fuel Type",
            TaxonomyCategory::LaunchYear => "Launch Year",
        }
    }

    /// Parse a category back from its slug
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

impl fmt::Display for TaxonomyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A named value within a taxonomy category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub category: TaxonomyCategory,
    pub name: String,
}

/// Publication status of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// A stored car record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarRecord {
    pub id: RecordId,

    /// Title, unique among published records
    pub title: String,

    pub status: PostStatus,

    /// Term assignments per category
    ///
    /// Normally one term per category, but readers must tolerate more.
    pub terms: BTreeMap<TaxonomyCategory, Vec<TermId>>,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl CarRecord {
    /// Create a record with no term assignments
    pub fn new(id: RecordId, title: impl Into<String>, status: PostStatus) -> Self {
        Self {
            id,
            title: title.into(),
            status,
            terms: BTreeMap::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Term ids assigned in a category (empty if none)
    pub fn terms_in(&self, category: TaxonomyCategory) -> &[TermId] {
        self.terms.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A file received from a form upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Whether a file was actually chosen
    ///
    /// Browsers send an empty part with no file name when the input is left blank.
    pub fn is_supplied(&self) -> bool {
        !self.file_name.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Metadata of a stored media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    pub file_name: String,
    pub content_type: String,
}

impl MediaItem {
    /// Public URL the media is served from
    pub fn url(&self) -> String {
        format!("/media/{}", self.id)
    }
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Total matching items across all pages
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}
