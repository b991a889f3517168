//! HTTP API handlers for hw-reader

pub mod buildinfo;
pub mod curation;
pub mod error;
pub mod favorites;
pub mod health;
pub mod ui;
pub mod view;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use health::health_routes;
pub use ui::{serve_app_js, serve_index};
pub use view::get_view;
