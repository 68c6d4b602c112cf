//! Carlot accepts visitor-submitted car listings and renders them back.
//!
//! The library holds the workflows and the storage contracts they run on:
//! - [`form`] renders the entry form from taxonomy terms
//! - [`submission`] validates and stores one form submission
//! - [`listing`] renders a page of published cars
//! - [`seed`] bootstraps sample terms and cars once
//!
//! Persistence sits behind the async traits in [`store`]; in-memory versions
//! ship here and SQLite-backed ones in `carlot-storage`.

pub mod entities;
pub mod error;
pub mod form;
pub mod listing;
pub mod sanitize;
pub mod seed;
pub mod store;
pub mod submission;
pub mod token;

mod templates;

// Re-export core types
pub use entities::{
    CarRecord, MediaId, MediaItem, Page, PostStatus, RecordId, TaxonomyCategory, Term, TermId,
    UploadedFile,
};
pub use error::{
    ProcessError, RenderError, Result, StoreError, SubmissionError, SubmissionErrorKind, TokenError,
};
pub use form::render_entry_form;
pub use listing::{ListingQuery, render_listing};
pub use seed::{SeedOutcome, seed_sample_data};
pub use store::Stores;
pub use submission::{CarEntry, RawSubmission, Submitted, handle_submission};
pub use token::{CAR_ENTRY_PURPOSE, TokenSigner};

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
