//! Hash-route rendering

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::route::Route;
use crate::views::{self, View};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    /// `location.hash` as the shell sees it, `#` included or not
    #[serde(default)]
    pub fragment: String,
}

/// GET /api/view?fragment=...
///
/// Always answers 200; failures are rendered into the view itself.
pub async fn get_view(State(state): State<AppState>, Query(query): Query<ViewQuery>) -> Json<View> {
    let route = Route::parse(&query.fragment);
    debug!(fragment = %query.fragment, route = ?route, "Rendering view");
    Json(views::render(&state, route).await)
}
