//! Health check route

use crate::error::Result;
use axum::response::Json;
use serde_json::{Value, json};

/// Health check endpoint
pub async fn health_check() -> Result<Json<Value>> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "carlot-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": time::OffsetDateTime::now_utc()
    })))
}
