//! Favorites endpoints

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use hw_common::cache::{FavoriteEntry, FavoriteToggle};
use hw_common::Prayer;

use super::ApiError;
use crate::records;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub status: FavoriteToggle,
    pub message: String,
}

/// GET /api/favorites
pub async fn list(State(state): State<AppState>) -> Json<Vec<FavoriteEntry>> {
    Json(state.favorites.list().await)
}

/// POST /api/favorites/toggle
///
/// Removing needs only the id; adding loads the record for its metadata.
pub async fn toggle(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let prayer = if state.favorites.contains(&request.version).await {
        Prayer::new(request.version.as_str(), "")
    } else {
        records::load_prayer(state.gateway.as_ref(), &state.prayers, &request.version)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Prayer with ID {} not found.", request.version)))?
    };

    let status = state.favorites.toggle(&prayer).await?;
    Ok(Json(ToggleResponse {
        status,
        message: status.message().to_string(),
    }))
}
