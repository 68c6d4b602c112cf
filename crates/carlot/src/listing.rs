//! Paginated public listing of published cars

use crate::entities::{CarRecord, MediaId, TaxonomyCategory};
use crate::error::RenderError;
use crate::store::Stores;
use crate::templates::{self, LISTING_TEMPLATE, PAGINATION_TEMPLATE};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Rendered when no published record falls on the requested page
pub const EMPTY_LISTING: &str = "No cars found.";

/// Categories shown for each listed car
const LISTED_CATEGORIES: [TaxonomyCategory; 3] = [
    TaxonomyCategory::Make,
    TaxonomyCategory::Model,
    TaxonomyCategory::FuelType,
];

/// Which page of the listing to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    pub page: u64,
    pub page_size: u64,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListingQuery {
    /// Build a query from raw request values
    ///
    /// Missing or non-positive values fall back to the defaults and the page
    /// size is capped at `max_page_size`.
    pub fn from_params(
        page: Option<i64>,
        page_size: Option<i64>,
        default_page_size: u64,
        max_page_size: u64,
    ) -> Self {
        let page = page.filter(|p| *p > 0).map(|p| p as u64).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s > 0)
            .map(|s| s as u64)
            .unwrap_or(default_page_size)
            .clamp(1, max_page_size.max(1));

        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Number of pages needed for `total` items
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// One listed car as the template sees it
#[derive(Serialize)]
struct ListedCar {
    title: String,
    thumbnail: Option<MediaId>,
    terms: Vec<TermLine>,
}

#[derive(Serialize)]
struct TermLine {
    label: &'static str,
    names: Vec<String>,
}

#[derive(Serialize)]
struct ListingContext {
    cars: Vec<ListedCar>,
}

#[derive(Serialize)]
struct PaginationContext {
    total_pages: u64,
    current: u64,
}

/// Render one page of published cars as an HTML fragment
pub async fn render_listing(stores: &Stores, query: ListingQuery) -> Result<String, RenderError> {
    let page = stores
        .content
        .query_published(query.offset(), query.page_size)
        .await?;
    debug!(
        "Listing page {} ({} of {} records)",
        query.page,
        page.items.len(),
        page.total
    );

    if page.items.is_empty() {
        return Ok(EMPTY_LISTING.to_string());
    }

    let mut cars = Vec::with_capacity(page.items.len());
    for record in &page.items {
        cars.push(listed_car(stores, record).await?);
    }
    let mut html = templates::render("listing.html", LISTING_TEMPLATE, ListingContext { cars })?;

    let pages = total_pages(page.total, query.page_size);
    if pages > 1 {
        html.push_str(&pagination(pages, query.page)?);
    }

    Ok(html)
}

async fn listed_car(stores: &Stores, record: &CarRecord) -> Result<ListedCar, RenderError> {
    let thumbnail = stores.media.thumbnail(record.id).await?.map(|m| m.id);

    let mut terms = Vec::with_capacity(LISTED_CATEGORIES.len());
    for category in LISTED_CATEGORIES {
        terms.push(TermLine {
            label: category.label(),
            names: term_names(stores, record, category).await?,
        });
    }

    Ok(ListedCar {
        title: record.title.clone(),
        thumbnail,
        terms,
    })
}

async fn term_names(
    stores: &Stores,
    record: &CarRecord,
    category: TaxonomyCategory,
) -> Result<Vec<String>, RenderError> {
    let mut names = Vec::new();
    for id in record.terms_in(category) {
        if let Some(term) = stores.taxonomy.get_term(*id).await? {
            names.push(term.name);
        }
    }
    Ok(names)
}

fn pagination(total_pages: u64, current: u64) -> Result<String, RenderError> {
    Ok(templates::render(
        "pagination.html",
        PAGINATION_TEMPLATE,
        PaginationContext {
            total_pages,
            current,
        },
    )?)
}
