//! Media routes

use crate::{
    AppState,
    error::{ApiError, Result},
};
use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use carlot::{MediaId, StoreError};
use tracing::debug;

/// Create media routes
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(get_media))
}

/// Serve stored media bytes with their content type
async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let media_id = id
        .parse::<u64>()
        .map(MediaId)
        .map_err(|_| ApiError::media_not_found(&id))?;
    debug!("Fetching media {}", media_id);

    let (item, bytes) = state.stores.media.fetch(media_id).await.map_err(|e| match e {
        StoreError::MediaNotFound(_) => ApiError::media_not_found(&id),
        other => ApiError::Store(other),
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, item.content_type),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        bytes,
    ))
}
