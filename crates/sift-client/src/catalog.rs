//! Field catalog access and load state.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;
use sift_query::{FieldIndex, FieldMetadata};

use crate::error::Result;

/// Source of field metadata.
#[async_trait]
pub trait FieldCatalog: Send + Sync {
    /// Fetches the fields, optionally restricted to one source category.
    async fn fetch_fields(&self, category: Option<&str>) -> Result<Vec<FieldMetadata>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogBody {
    Bare(Vec<FieldMetadata>),
    Wrapped { fields: Vec<FieldMetadata> },
}

/// Parses a catalog response: either a bare array of fields or
/// `{"fields": [...]}`.
pub fn parse_catalog(body: &str) -> Result<Vec<FieldMetadata>> {
    let fields = match serde_json::from_str::<CatalogBody>(body)? {
        CatalogBody::Bare(fields) | CatalogBody::Wrapped { fields } => fields,
    };
    Ok(fields)
}

/// Load state of the field catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CatalogState {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    Ready(FieldIndex),
    /// Last fetch failed; the message is shown next to a retry control.
    Failed(String),
}

impl CatalogState {
    /// The loaded index, if any.
    pub fn index(&self) -> Option<&FieldIndex> {
        match self {
            CatalogState::Ready(index) => Some(index),
            _ => None,
        }
    }

    /// Loaded fields; empty unless the catalog is ready.
    pub fn fields(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.index().into_iter().flat_map(|index| index.iter())
    }

    /// Filtering is only offered once fields are known.
    pub fn filtering_enabled(&self) -> bool {
        matches!(self, CatalogState::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CatalogState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CatalogState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Fetches the catalog and tracks its [`CatalogState`].
///
/// Fetch failures are recorded in the state rather than returned. Loads are
/// not cancelled when a newer one starts; whichever finishes last decides
/// the state.
#[derive(Clone)]
pub struct CatalogLoader {
    catalog: Arc<dyn FieldCatalog>,
    category: Option<String>,
    state: Arc<Mutex<CatalogState>>,
}

impl CatalogLoader {
    pub fn new(catalog: Arc<dyn FieldCatalog>) -> Self {
        CatalogLoader {
            catalog,
            category: None,
            state: Arc::new(Mutex::new(CatalogState::Idle)),
        }
    }

    /// Restricts loads to one source category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CatalogState {
        self.lock().clone()
    }

    /// Fetches the catalog and returns the resulting state.
    pub async fn load(&self) -> CatalogState {
        *self.lock() = CatalogState::Loading;
        tracing::debug!(category = ?self.category, "fetching field catalog");

        let next = match self.catalog.fetch_fields(self.category.as_deref()).await {
            Ok(fields) => {
                tracing::info!(count = fields.len(), "field catalog loaded");
                CatalogState::Ready(FieldIndex::from_fields(fields))
            }
            Err(err) => {
                tracing::warn!(error = %err, "field catalog fetch failed");
                CatalogState::Failed(err.to_string())
            }
        };
        *self.lock() = next.clone();
        next
    }

    /// Loads again after a failure.
    pub async fn retry(&self) -> CatalogState {
        tracing::debug!("retrying field catalog fetch");
        self.load().await
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CatalogLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLoader")
            .field("category", &self.category)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
