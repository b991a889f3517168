//! # Holy Writings Common Library
//!
//! Shared code for the Holy Writings reader:
//! - Prayer records and the remote query gateway
//! - Keyed local store with SQLite and in-memory backends
//! - Record, favorites and language caches
//! - Curation (matching tool) state, SQL compilation and exports
//! - Configuration loading

pub mod cache;
pub mod config;
pub mod curation;
pub mod error;
pub mod gateway;
pub mod prayer;
pub mod race;
pub mod sql;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use gateway::{DoltHubGateway, GatewayError, QueryGateway, Row};
pub use prayer::Prayer;
pub use store::{KeyedStore, MemoryStore, SqliteStore};
