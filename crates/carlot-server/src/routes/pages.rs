//! Full page and client script

use crate::{AppState, error::Result, models::ListingParams};
use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
};
use carlot::{CAR_ENTRY_PURPOSE, render_entry_form, render_listing};

const CAR_ENTRY_SCRIPT: &str = include_str!("../../assets/car-entry.js");

/// Create page routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/assets/car-entry.js", get(car_entry_script))
}

/// Entry form above the listing
///
/// Pagination links are relative, so `?page=n` lands back on this page.
async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Html<String>> {
    let token = state.signer.issue(CAR_ENTRY_PURPOSE);
    let form = render_entry_form(state.stores.taxonomy.as_ref(), &token).await?;

    let query = params.to_query(state.config.default_page_size, state.config.max_page_size);
    let listing = render_listing(&state.stores, query).await?;

    Ok(Html(format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>Cars</title>\n",
            "</head>\n",
            "<body>\n",
            "<section class=\"car-entry\">\n{}</section>\n",
            "<section class=\"car-listing\">\n{}</section>\n",
            "<script src=\"/assets/car-entry.js\" defer></script>\n",
            "</body>\n",
            "</html>\n"
        ),
        form, listing
    )))
}

async fn car_entry_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CAR_ENTRY_SCRIPT,
    )
}
