//! hw-reader library - Holy Writings reader service
//!
//! Serves a hash-routed browser shell. The shell forwards `location.hash` to
//! `/api/view`, which parses it with [`route::Route`] and renders the matching
//! view to an HTML fragment. Curation and favorites actions are JSON
//! endpoints that mutate server-held state.

use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use hw_common::cache::{Favorites, LanguageNames, PrayerCache, RecentLanguages};
use hw_common::config::Settings;
use hw_common::curation::{CurationTool, Handoff};
use hw_common::{KeyedStore, QueryGateway};

pub mod api;
pub mod pagination;
pub mod records;
pub mod route;
pub mod views;

use route::PageMemory;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyedStore>,
    pub gateway: Arc<dyn QueryGateway>,
    pub prayers: PrayerCache,
    pub favorites: Favorites,
    pub recent: RecentLanguages,
    pub language_names: Arc<LanguageNames>,
    /// Pinned prayer and collected proposals
    pub curation: Arc<Mutex<CurationTool>>,
    /// Last page per language, search term and phelps code
    pub pages: Arc<Mutex<PageMemory>>,
    pub handoff: Arc<Handoff>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn KeyedStore>, gateway: Arc<dyn QueryGateway>, settings: &Settings) -> Self {
        let language_names = LanguageNames::new(store.clone(), gateway.clone(), settings.ui_language.clone());
        Self::with_language_names(store, gateway, language_names, settings.handoff.clone())
    }

    /// Same as [`AppState::new`] with a preconfigured language-name lookup
    pub fn with_language_names(
        store: Arc<dyn KeyedStore>,
        gateway: Arc<dyn QueryGateway>,
        language_names: LanguageNames,
        handoff: Handoff,
    ) -> Self {
        Self {
            prayers: PrayerCache::new(store.clone()),
            favorites: Favorites::new(store.clone()),
            recent: RecentLanguages::new(store.clone()),
            language_names: Arc::new(language_names),
            curation: Arc::new(Mutex::new(CurationTool::new())),
            pages: Arc::new(Mutex::new(PageMemory::new())),
            handoff: Arc::new(handoff),
            store,
            gateway,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    let curation = Router::new()
        .route("/api/curation", get(api::curation::get_panel))
        .route("/api/curation/pin", post(api::curation::pin))
        .route("/api/curation/unpin", post(api::curation::unpin))
        .route("/api/curation/equivalence", post(api::curation::propose_equivalence))
        .route("/api/curation/phelps", post(api::curation::propose_phelps))
        .route("/api/curation/language", post(api::curation::propose_language))
        .route("/api/curation/name", post(api::curation::propose_name))
        .route("/api/curation/note", post(api::curation::propose_note))
        .route("/api/curation/clear", post(api::curation::clear_all))
        .route("/api/curation/items/:index", delete(api::curation::remove_proposal))
        .route("/api/curation/mail", get(api::curation::mail_draft))
        .route("/api/curation/issue", get(api::curation::issue))
        .route("/api/curation/query-url", get(api::curation::query_url))
        .route("/api/curation/chat", get(api::curation::chat_link));

    let reader = Router::new()
        .route("/api/view", get(api::get_view))
        .route("/api/favorites", get(api::favorites::list))
        .route("/api/favorites/toggle", post(api::favorites::toggle))
        .route("/api/buildinfo", get(api::get_build_info));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(curation)
        .merge(reader)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
