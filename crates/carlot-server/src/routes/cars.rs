//! Car entry and listing routes

use crate::{
    AppState,
    error::{ApiError, Result},
    models::{ListingParams, SubmitReply},
};
use axum::{
    Router,
    extract::{Multipart, Query, State, multipart::Field},
    response::Html,
    routing::get,
};
use carlot::{
    CAR_ENTRY_PURPOSE, ProcessError, RawSubmission, UploadedFile, form::fields,
    handle_submission, render_entry_form, render_listing,
};
use tracing::{debug, info, warn};

/// Create car routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(submit_car))
        .route("/new", get(entry_form))
}

/// Render one page of published cars
async fn list_cars(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Html<String>> {
    let query = params.to_query(state.config.default_page_size, state.config.max_page_size);
    debug!("Listing cars: {:?}", query);

    let html = render_listing(&state.stores, query).await?;
    Ok(Html(html))
}

/// Render the entry form with a freshly minted token
async fn entry_form(State(state): State<AppState>) -> Result<Html<String>> {
    let token = state.signer.issue(CAR_ENTRY_PURPOSE);
    let html = render_entry_form(state.stores.taxonomy.as_ref(), &token).await?;
    Ok(Html(html))
}

/// Accept a multipart car entry
async fn submit_car(State(state): State<AppState>, multipart: Multipart) -> Result<SubmitReply> {
    let raw = read_submission(multipart).await?;

    match handle_submission(&state.stores, &state.signer, raw).await {
        Ok(submitted) => {
            info!("Car entry stored as record {}", submitted.record);
            Ok(submitted.into())
        }
        Err(ProcessError::Rejected(e)) => {
            warn!("Car entry rejected: {}", e);
            Ok(e.into())
        }
        Err(ProcessError::Store(e)) => Err(ApiError::Store(e)),
    }
}

/// Collect the known form fields; anything else is ignored
async fn read_submission(mut multipart: Multipart) -> Result<RawSubmission> {
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(&e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            fields::CAR_NAME => raw.car_name = Some(text(field).await?),
            fields::MAKE => raw.make = Some(text(field).await?),
            fields::MODEL => raw.model = Some(text(field).await?),
            fields::FUEL_TYPE => raw.fuel_type = Some(text(field).await?),
            fields::LAUNCH_YEAR => raw.launch_year = Some(text(field).await?),
            fields::CSRF_TOKEN => raw.csrf_token = Some(text(field).await?),
            fields::IMAGE => raw.image = Some(file(field).await?),
            other => debug!("Ignoring unexpected form field: {}", other),
        }
    }

    Ok(raw)
}

async fn text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(&e.body_text()))
}

async fn file(field: Field<'_>) -> Result<UploadedFile> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(&e.body_text()))?;

    Ok(UploadedFile::new(file_name, content_type, bytes.to_vec()))
}
