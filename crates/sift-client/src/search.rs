//! Search execution and result state.
//!
//! A [`SearchSession`] owns the result state shown under the filter editor.
//! Edits call [`SearchSession::schedule`]; after the debounce delay the
//! request is sent and its response applied. Requests already sent are
//! never cancelled, and responses are applied in the order they arrive, so a
//! slow response to an older request can replace the results of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_query::{ColumnKind, SearchRequest};

use crate::debounce::Debouncer;
use crate::error::Result;

/// Column of the results table, as described by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub field: String,
    #[serde(
        rename = "headerName",
        alias = "header_name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub header_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(field: impl Into<String>) -> Self {
        ColumnDescriptor {
            field: field.into(),
            header_name: None,
            column_type: None,
        }
    }

    pub fn with_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }

    /// Filter kind for this column; untyped columns filter as text.
    pub fn kind(&self) -> ColumnKind {
        self.column_type
            .as_deref()
            .map(ColumnKind::from_type_name)
            .unwrap_or_default()
    }

    pub fn label(&self) -> &str {
        self.header_name.as_deref().unwrap_or(&self.field)
    }
}

/// Body returned by the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<serde_json::Value>,
}

/// Executes search requests.
#[async_trait]
pub trait SearchEndpoint: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

/// What the results area currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub results: Vec<serde_json::Value>,
    pub columns: Vec<ColumnDescriptor>,
    pub total: u64,
    pub facets: Option<serde_json::Value>,
    /// Message of the last failed search; cleared by the next success.
    pub error: Option<String>,
    /// Requests sent but not yet answered.
    pub in_flight: usize,
    /// Sequence number of the response currently shown.
    pub applied_seq: Option<u64>,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    fn apply(&mut self, outcome: Result<SearchResponse>) {
        match outcome {
            Ok(response) => {
                self.results = response.results;
                self.columns = response.columns;
                self.total = response.total;
                self.facets = response.facets;
                self.error = None;
            }
            Err(err) => {
                self.results.clear();
                self.columns.clear();
                self.total = 0;
                self.facets = None;
                self.error = Some(err.to_string());
            }
        }
    }
}

struct Shared {
    endpoint: Arc<dyn SearchEndpoint>,
    state: Mutex<SearchState>,
    next_seq: AtomicU64,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, request: SearchRequest) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.lock().in_flight += 1;
        tracing::debug!(seq, limit = request.limit, offset = request.offset, "dispatching search");

        let outcome = self.endpoint.search(&request).await;

        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.applied_seq.is_some_and(|applied| applied > seq) {
            tracing::debug!(seq, "applying response older than the one shown");
        }
        match &outcome {
            Ok(response) => tracing::debug!(seq, total = response.total, "search completed"),
            Err(err) => tracing::warn!(seq, error = %err, "search failed"),
        }
        state.apply(outcome);
        state.applied_seq = Some(seq);
    }
}

/// Debounced search execution plus the state it updates.
pub struct SearchSession {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl SearchSession {
    pub fn new(endpoint: Arc<dyn SearchEndpoint>, debounce: Duration) -> Self {
        SearchSession {
            shared: Arc::new(Shared {
                endpoint,
                state: Mutex::new(SearchState::default()),
                next_seq: AtomicU64::new(0),
            }),
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Sends `request` once no other request has been scheduled for the
    /// debounce delay. Must be called from within a tokio runtime.
    pub fn schedule(&self, request: SearchRequest) {
        let shared = Arc::clone(&self.shared);
        self.debouncer
            .schedule(move || async move { shared.run(request).await });
    }

    /// Sends `request` now and applies its response before returning.
    pub async fn execute(&self, request: SearchRequest) -> SearchState {
        self.shared.run(request).await;
        self.state()
    }

    /// Drops the scheduled request, if it has not been sent yet.
    pub fn cancel_pending(&self) -> bool {
        self.debouncer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.shared.lock().clone()
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("state", &self.state())
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}
