//! Sift Client - field catalog and search calls for sift filter criteria.
//!
//! The query crate compiles filter state into a [`SearchRequest`]; this crate
//! gets the field catalog in and the search request out:
//!
//! - [`FieldCatalog`] and [`SearchEndpoint`]: async seams to the backend,
//!   with [`HttpBackend`] as the JSON-over-HTTP implementation
//! - [`CatalogLoader`]: tracks catalog load state; failures degrade to an
//!   empty field list with retry
//! - [`SearchSession`]: debounced search execution and the result state
//! - [`ClientConfig`]: endpoints, timeout, debounce delay, page size
//!
//! # Concurrency
//!
//! Only two operations suspend: fetching the catalog and executing a search.
//! Neither is cancelled when superseded. The debounce timer is the only thing
//! that is cancelled: a new edit inside the delay replaces the pending
//! request before it is sent.
//!
//! [`SearchRequest`]: sift_query::SearchRequest

mod catalog;
mod config;
mod debounce;
mod error;
mod http;
mod search;

// Re-export public API
pub use catalog::{parse_catalog, CatalogLoader, CatalogState, FieldCatalog};
pub use config::{
    ClientConfig, EnvReader, MockEnv, RealEnv, DEFAULT_BASE_URL, DEFAULT_CATALOG_PATH,
    DEFAULT_DEBOUNCE, DEFAULT_SEARCH_PATH, DEFAULT_TIMEOUT, ENV_BASE_URL, ENV_CATALOG_PATH,
    ENV_DEBOUNCE_MS, ENV_PAGE_SIZE, ENV_SEARCH_PATH, ENV_TIMEOUT_SECS,
};
pub use debounce::Debouncer;
pub use error::{ClientError, Result};
pub use http::HttpBackend;
pub use search::{ColumnDescriptor, SearchEndpoint, SearchResponse, SearchSession, SearchState};
